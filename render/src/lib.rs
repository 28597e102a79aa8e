//! # Bookings Render
//!
//! Template cache and render pipeline. Every page render merges the
//! visitor's session-scoped ephemeral state (one-shot messages, CSRF
//! token, authenticated flag) into a per-request [`TemplateData`] bag,
//! looks up the compiled page by name, and produces the response body.
//!
//! Caching is a deployment choice made at construction time: a
//! [`Renderer::cached`] instance compiles once and serves from memory for
//! the process lifetime; [`Renderer::reloading`] recompiles from disk on
//! every call and exists only for iterative template development.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

mod cache;
mod data;
mod error;

pub use cache::{FilterFn, HelperSet, TemplateCache};
pub use data::TemplateData;
pub use error::{RenderError, Result};

use bookings_core::Session;
use std::path::{Path, PathBuf};
use tracing::error;

#[derive(Debug)]
enum Source {
    Cached(TemplateCache),
    Reload { dir: PathBuf, helpers: HelperSet },
}

/// The render pipeline.
#[derive(Debug)]
pub struct Renderer {
    source: Source,
}

impl Renderer {
    /// Compile the template directory once and serve from memory.
    ///
    /// # Errors
    ///
    /// Fails fast on an unreadable directory or unparsable template;
    /// callers should treat this as fatal at startup rather than serve
    /// broken pages.
    pub fn cached(dir: &Path, helpers: &HelperSet) -> Result<Self> {
        Ok(Self {
            source: Source::Cached(TemplateCache::build(dir, helpers)?),
        })
    }

    /// Recompile the directory on every render call.
    #[must_use]
    pub fn reloading(dir: &Path, helpers: &HelperSet) -> Self {
        Self {
            source: Source::Reload {
                dir: dir.to_path_buf(),
                helpers: helpers.clone(),
            },
        }
    }

    /// Render `name` against `data` merged with the session's state.
    ///
    /// Pipeline order:
    /// 1. pop flash/warning/error from the session (each visible exactly
    ///    once),
    /// 2. issue-or-fetch the session's CSRF token,
    /// 3. set the authenticated flag from the visitor identity,
    /// 4. look up the page — [`RenderError::TemplateNotFound`] is a
    ///    deployment error, surfaced as a 500-class failure upstream,
    /// 5. execute the template; execution failures are logged and yield
    ///    whatever was produced (best-effort), not an error.
    pub fn render(&self, name: &str, data: TemplateData, session: &Session) -> Result<String> {
        let mut data = data;
        data.flash = session.pop_flash().unwrap_or_default();
        data.warning = session.pop_warning().unwrap_or_default();
        data.error = session.pop_error().unwrap_or_default();
        data.csrf_token = session.csrf_token();
        data.is_authenticated = session.is_authenticated();

        match &self.source {
            Source::Cached(cache) => Self::execute(cache, name, &data),
            Source::Reload { dir, helpers } => {
                let cache = TemplateCache::build(dir, helpers)?;
                Self::execute(&cache, name, &data)
            }
        }
    }

    fn execute(cache: &TemplateCache, name: &str, data: &TemplateData) -> Result<String> {
        if !cache.contains(name) {
            return Err(RenderError::TemplateNotFound(name.to_string()));
        }
        let context = match tera::Context::from_serialize(data) {
            Ok(context) => context,
            Err(err) => {
                error!(template = name, error = %err, "template data did not serialize");
                return Ok(String::new());
            }
        };
        match cache.tera().render(name, &context) {
            Ok(body) => Ok(body),
            Err(err) => {
                // Best effort: a partially-broken page is logged, not fatal.
                error!(template = name, error = %err, "template execution failed");
                Ok(String::new())
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use bookings_core::Session;
    use std::fs;
    use tempfile::TempDir;

    fn template_dir() -> TempDir {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("base.layout.html"),
            "<html><body>{% block content %}{% endblock content %}\
             <p class=\"flash\">{{ flash }}</p>\
             <p class=\"error\">{{ error }}</p></body></html>",
        )
        .unwrap();
        fs::write(
            dir.path().join("home.page.html"),
            "{% extends \"base.layout.html\" %}\
             {% block content %}<h1>Home</h1>\
             {% if is_authenticated %}<a href=\"/logout\">Logout</a>{% endif %}\
             <input name=\"csrf_token\" value=\"{{ csrf_token }}\">{% endblock content %}",
        )
        .unwrap();
        dir
    }

    fn renderer(dir: &TempDir) -> Renderer {
        Renderer::cached(dir.path(), &HelperSet::standard()).unwrap()
    }

    #[test]
    fn renders_page_with_layout() {
        let dir = template_dir();
        let out = renderer(&dir)
            .render("home.page.html", TemplateData::new(), &Session::fresh())
            .unwrap();

        assert!(out.contains("<h1>Home</h1>"));
        assert!(out.starts_with("<html>"));
    }

    #[test]
    fn flash_is_visible_exactly_once() {
        let dir = template_dir();
        let renderer = renderer(&dir);
        let session = Session::fresh();
        session.set_flash("X");

        let first = renderer
            .render("home.page.html", TemplateData::new(), &session)
            .unwrap();
        let second = renderer
            .render("home.page.html", TemplateData::new(), &session)
            .unwrap();

        assert!(first.contains("<p class=\"flash\">X</p>"));
        assert!(second.contains("<p class=\"flash\"></p>"));
    }

    #[test]
    fn missing_template_is_a_lookup_error() {
        let dir = template_dir();
        let err = renderer(&dir)
            .render("nope.page.html", TemplateData::new(), &Session::fresh())
            .unwrap_err();

        assert!(matches!(err, RenderError::TemplateNotFound(name) if name == "nope.page.html"));
    }

    #[test]
    fn csrf_token_and_auth_flag_come_from_the_session() {
        let dir = template_dir();
        let renderer = renderer(&dir);
        let session = Session::fresh();

        let anonymous = renderer
            .render("home.page.html", TemplateData::new(), &session)
            .unwrap();
        assert!(!anonymous.contains("Logout"));
        assert!(anonymous.contains(&format!("value=\"{}\"", session.csrf_token())));

        session.log_in(1);
        let logged_in = renderer
            .render("home.page.html", TemplateData::new(), &session)
            .unwrap();
        assert!(logged_in.contains("Logout"));
    }

    #[test]
    fn unparsable_template_fails_compilation() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("bad.page.html"), "{% block half").unwrap();

        let err = Renderer::cached(dir.path(), &HelperSet::empty()).unwrap_err();
        assert!(matches!(err, RenderError::Compilation(_)));
    }

    #[test]
    fn reloading_mode_sees_new_templates() {
        let dir = template_dir();
        let renderer = Renderer::reloading(dir.path(), &HelperSet::standard());

        fs::write(
            dir.path().join("late.page.html"),
            "{% extends \"base.layout.html\" %}{% block content %}late{% endblock content %}",
        )
        .unwrap();

        let out = renderer
            .render("late.page.html", TemplateData::new(), &Session::fresh())
            .unwrap();
        assert!(out.contains("late"));
    }

    #[test]
    fn helper_filters_format_dates() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("dates.page.html"),
            "{{ string_map.when | human_date }}|{{ string_map.at | date_with_time }}",
        )
        .unwrap();
        let renderer = Renderer::cached(dir.path(), &HelperSet::standard()).unwrap();

        let data = TemplateData::new()
            .with_string("when", "2026-09-01")
            .with_string("at", "2026-09-01T14:30:00");
        let out = renderer
            .render("dates.page.html", data, &Session::fresh())
            .unwrap();

        assert_eq!(out, "2026-09-01|2026-09-01 14:30");
    }
}
