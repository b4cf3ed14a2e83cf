use axum::response::Html;
use common::utils::template_engine::ProvidesTemplateEngine;
use minijinja::Value;

use crate::error::HtmlError;

/// Renders a full page template from any state carrying the engine.
pub(crate) fn render_page<S: ProvidesTemplateEngine>(
    state: &S,
    template: &str,
    ctx: &Value,
) -> Result<Html<String>, HtmlError> {
    Ok(Html(state.template_engine().render(template, ctx)?))
}

/// Renders one block of a template, for htmx swaps that replace a single
/// page region instead of the whole document.
pub(crate) fn render_fragment<S: ProvidesTemplateEngine>(
    state: &S,
    template: &str,
    block: &str,
    ctx: &Value,
) -> Result<Html<String>, HtmlError> {
    Ok(Html(
        state.template_engine().render_block(template, block, ctx)?,
    ))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use common::create_template_engine;
    use common::utils::template_engine::TemplateEngine;
    use minijinja::context;
    use review_pipeline::review::fallback_review;

    use super::*;
    use crate::routes::review::ReportContext;

    struct Fixture {
        templates: Arc<TemplateEngine>,
    }

    impl ProvidesTemplateEngine for Fixture {
        fn template_engine(&self) -> &Arc<TemplateEngine> {
            &self.templates
        }
    }

    fn fixture() -> Fixture {
        Fixture {
            templates: Arc::new(create_template_engine!("templates")),
        }
    }

    #[test]
    fn report_block_renders_without_page_chrome() {
        let report = ReportContext {
            static_analysis: analysis_pipeline::analyze("def f():\n    return 1\n", None),
            ai_review: fallback_review("gemini-pro"),
        };
        let ctx = context! { report => report };

        let Html(body) =
            render_fragment(&fixture(), "report.html", "report", &ctx).expect("fragment");
        assert!(body.contains("Valid Python syntax"));
        assert!(body.contains("gemini-pro (fallback)"));
        assert!(!body.contains("<form"));
    }

    #[test]
    fn missing_block_is_an_error() {
        let ctx = context! {};
        assert!(render_fragment(&fixture(), "report.html", "no-such-block", &ctx).is_err());
    }
}
