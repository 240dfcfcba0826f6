//! Human-readable rendering.

use std::fmt::Write;

use super::{format_timestamp, CheckMap, CheckOutcome, SweepReport};

const OK: &str = "✅";
const NOT_OK: &str = "❌";

fn glyph(ok: bool) -> &'static str {
    if ok {
        OK
    } else {
        NOT_OK
    }
}

impl SweepReport {
    /// Heading, summary, non-empty categories, then errors, warnings and fixes.
    pub fn to_markdown(&self) -> String {
        let summary = self.summary();
        let mut md = String::new();

        md.push_str("# AI Agent Sweep Report\n\n");
        let _ = writeln!(md, "**Generated:** {}\n", format_timestamp(&self.timestamp));

        md.push_str("## Summary\n\n");
        let _ = writeln!(md, "- **Total Errors:** {}", summary.total_errors);
        let _ = writeln!(md, "- **Auto-fixable Errors:** {}", summary.auto_fixable_errors);
        let _ = writeln!(md, "- **Warnings:** {}", summary.warnings);
        let _ = writeln!(md, "- **Fixes Applied:** {}", summary.fixes_applied);
        let _ = writeln!(md, "- **Successful Fixes:** {}", summary.successful_fixes);
        md.push('\n');

        write_category(&mut md, "Deployment Status", &self.deployment_status);
        write_category(&mut md, "Connection Health", &self.connection_health);
        write_category(&mut md, "AI Agent Status", &self.ai_agent_status);

        if let Some(database) = &self.database_status {
            md.push_str("## Database Status\n\n");
            write_outcome(&mut md, database);
        }

        write_category(&mut md, "Payment Integration Status", &self.payment_status);
        write_category(&mut md, "Frontend & UI Status", &self.ui_status);

        if !self.errors.is_empty() {
            md.push_str("## Errors\n\n");
            for (i, error) in self.errors.iter().enumerate() {
                let tag = if error.can_auto_fix {
                    "🔧 Auto-fixable"
                } else {
                    "⚠️ Manual review required"
                };
                let _ = writeln!(md, "{}. **{}**", i + 1, tag);
                let _ = writeln!(md, "   - {}", error.message);
                let _ = writeln!(md, "   - Time: {}", format_timestamp(&error.timestamp));
            }
            md.push('\n');
        }

        if !self.warnings.is_empty() {
            md.push_str("## Warnings\n\n");
            for (i, warning) in self.warnings.iter().enumerate() {
                let _ = writeln!(md, "{}. {}", i + 1, warning.message);
            }
            md.push('\n');
        }

        if !self.fixes_applied.is_empty() {
            md.push_str("## Fixes Applied\n\n");
            for (i, fix) in self.fixes_applied.iter().enumerate() {
                let _ = writeln!(md, "{}. {} {}", i + 1, glyph(fix.success), fix.description);
                let _ = writeln!(md, "   - Time: {}", format_timestamp(&fix.timestamp));
            }
            md.push('\n');
        }

        md
    }
}

fn write_category(md: &mut String, title: &str, checks: &CheckMap) {
    if checks.is_empty() {
        return;
    }
    let _ = writeln!(md, "## {}\n", title);
    for outcome in checks.iter() {
        write_outcome(md, outcome);
    }
}

fn write_outcome(md: &mut String, outcome: &CheckOutcome) {
    let _ = writeln!(md, "### {} {}\n", glyph(outcome.status.is_ok()), outcome.name);
    let _ = writeln!(md, "- **Status:** {}", outcome.status);
    if let Some(error) = outcome.details.get("error").and_then(|v| v.as_str()) {
        let _ = writeln!(md, "- **Error:** {}", error);
    }
    let _ = writeln!(md, "- **Checked:** {}\n", format_timestamp(&outcome.checked_at));
}

#[cfg(test)]
mod tests {
    use crate::report::{Details, SweepReport};
    use crate::status::CheckStatus;

    #[test]
    fn empty_categories_are_omitted() {
        let md = SweepReport::new().to_markdown();
        assert!(md.starts_with("# AI Agent Sweep Report"));
        assert!(md.contains("- **Total Errors:** 0"));
        assert!(!md.contains("## Deployment Status"));
        assert!(!md.contains("## Errors"));
    }

    #[test]
    fn sections_follow_fixed_order() {
        let mut report = SweepReport::new();
        report.add_fix("Remove stale lock file /tmp/empire.lock", true);
        report.add_warning("Stripe not configured");
        report.add_error("Stale lock file found for PID 4242", true);
        report.add_ui_check("route_/", CheckStatus::Healthy, Details::new());
        report.add_deployment_check("render_backend", CheckStatus::Unconfigured, Details::new());

        let md = report.to_markdown();
        let position = |needle: &str| md.find(needle).unwrap();
        assert!(position("## Deployment Status") < position("## Frontend & UI Status"));
        assert!(position("## Frontend & UI Status") < position("## Errors"));
        assert!(position("## Errors") < position("## Warnings"));
        assert!(position("## Warnings") < position("## Fixes Applied"));
    }

    #[test]
    fn glyphs_and_tags() {
        let mut report = SweepReport::new();
        report.add_payment_check("paypal", CheckStatus::Configured, Details::new());
        report.add_payment_check("stripe", CheckStatus::Warning, Details::new());
        report.add_error("Stale lock file found for PID 4242", true);
        report.add_error("Database issue: DATABASE_URL not set", false);
        report.add_fix("Clear cache", false);

        let md = report.to_markdown();
        assert!(md.contains("### ✅ paypal"));
        assert!(md.contains("### ❌ stripe"));
        assert!(md.contains("🔧 Auto-fixable"));
        assert!(md.contains("⚠️ Manual review required"));
        assert!(md.contains("1. ❌ Clear cache"));
    }

    #[test]
    fn every_json_error_appears_verbatim() {
        let mut report = SweepReport::new();
        let messages = [
            "Render deployment issue: Missing RENDER_API_KEY or RENDER_SERVICE_ID",
            "Required environment variable missing: PAYPAL_SECRET",
            "Backend health check failed: error sending request for url (http://127.0.0.1:1/healthz)",
        ];
        for (i, message) in messages.iter().enumerate() {
            report.add_error(*message, i % 2 == 0);
        }

        let value = report.to_value().unwrap();
        let md = report.to_markdown();
        let errors_section = &md[md.find("## Errors").unwrap()..];
        for error in value["errors"].as_array().unwrap() {
            let message = error["message"].as_str().unwrap();
            assert!(errors_section.contains(message), "missing {}", message);
        }
    }
}
