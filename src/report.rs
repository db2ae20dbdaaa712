//! Terminal rendering of a finished run.

use std::fmt::Write;

use crate::models::{CompanyRecord, RunState};

const TECH_STACK_SHOWN: usize = 5;
const LANGUAGES_SHOWN: usize = 5;
const INTEGRATIONS_SHOWN: usize = 4;

/// Human-readable report: one block per company, then the recommendation.
pub fn render(state: &RunState) -> String {
    let mut out = String::new();
    let rule = "=".repeat(60);

    let _ = writeln!(out, "{}", rule);
    let _ = writeln!(out, "RESULTS FOR: {}", state.query);
    let _ = writeln!(out, "{}", rule);

    if state.companies.is_empty() {
        let _ = writeln!(out, "\nNo tools could be researched for this query.");
    }

    for (i, company) in state.companies.iter().enumerate() {
        render_company(&mut out, i + 1, company);
    }

    if let Some(analysis) = &state.analysis {
        let _ = writeln!(out, "\nDeveloper Recommendations:");
        let _ = writeln!(out, "{}", "-".repeat(40));
        let _ = writeln!(out, "{}", analysis.trim());
    }

    let _ = writeln!(out, "{}", rule);
    out
}

fn render_company(out: &mut String, index: usize, company: &CompanyRecord) {
    let _ = writeln!(out, "\n{}. {}", index, company.name);
    let _ = writeln!(out, "   Website: {}", company.website);
    let _ = writeln!(
        out,
        "   Pricing: {}",
        company.pricing_model.as_deref().unwrap_or("Unknown")
    );
    let _ = writeln!(out, "   Open Source: {}", yes_no(company.is_open_source));

    if !company.tech_stack.is_empty() {
        let _ = writeln!(out, "   Tech Stack: {}", first_n(&company.tech_stack, TECH_STACK_SHOWN));
    }
    if !company.language_support.is_empty() {
        let _ = writeln!(
            out,
            "   Language Support: {}",
            first_n(&company.language_support, LANGUAGES_SHOWN)
        );
    }
    if company.api_available.is_some() {
        let api = if company.api_available == Some(true) {
            "Available"
        } else {
            "Not Available"
        };
        let _ = writeln!(out, "   API: {}", api);
    }
    if !company.integration_capabilities.is_empty() {
        let _ = writeln!(
            out,
            "   Integrations: {}",
            first_n(&company.integration_capabilities, INTEGRATIONS_SHOWN)
        );
    }
    if !company.description.trim().is_empty() && !company.analysis_failed() {
        let _ = writeln!(out, "   Description: {}", company.description.trim());
    }
}

fn yes_no(flag: Option<bool>) -> &'static str {
    match flag {
        Some(true) => "Yes",
        Some(false) => "No",
        None => "Unknown",
    }
}

fn first_n(items: &[String], n: usize) -> String {
    items.iter().take(n).cloned().collect::<Vec<_>>().join(", ")
}
