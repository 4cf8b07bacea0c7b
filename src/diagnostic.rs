use crate::span::Span;

/// A diagnostic reported while parsing or synthesizing a spec file.
#[derive(Clone, Debug)]
pub struct Diagnostic {
    pub severity: Severity,
    pub message: String,
    pub span: Span,
    pub notes: Vec<String>,
    pub help: Option<String>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Severity {
    Error,
    Warning,
}

impl Diagnostic {
    pub fn error(message: String, span: Span) -> Self {
        Self {
            severity: Severity::Error,
            message,
            span,
            notes: Vec::new(),
            help: None,
        }
    }

    pub fn warning(message: String, span: Span) -> Self {
        Self {
            severity: Severity::Warning,
            message,
            span,
            notes: Vec::new(),
            help: None,
        }
    }

    pub fn with_note(mut self, note: String) -> Self {
        self.notes.push(note);
        self
    }

    pub fn with_help(mut self, help: String) -> Self {
        self.help = Some(help);
        self
    }

    /// Diagnostic for a failed spec resolution, anchored at the owning
    /// spec declaration.
    pub fn from_resolution(err: &crate::synth::SpecResolutionError, span: Span) -> Self {
        Diagnostic::error(err.to_string(), span)
            .with_note("clauses may only reference the specification's parameters".to_string())
    }

    /// Render the diagnostic to stderr using ariadne.
    pub fn render(&self, filename: &str, source: &str) {
        use ariadne::{Color, Label, Report, ReportKind, Source};

        let kind = match self.severity {
            Severity::Error => ReportKind::Error,
            Severity::Warning => ReportKind::Warning,
        };

        let color = match self.severity {
            Severity::Error => Color::Red,
            Severity::Warning => Color::Yellow,
        };

        let mut report = Report::build(kind, filename, self.span.start as usize)
            .with_message(&self.message)
            .with_label(
                Label::new((filename, self.span.start as usize..self.span.end as usize))
                    .with_message(&self.message)
                    .with_color(color),
            );

        for note in &self.notes {
            report = report.with_note(note);
        }

        if let Some(help) = &self.help {
            report = report.with_help(help);
        }

        report
            .finish()
            .eprint((filename, Source::from(source)))
            .unwrap();
    }
}

/// Render a list of diagnostics.
pub fn render_diagnostics(diagnostics: &[Diagnostic], filename: &str, source: &str) {
    for diag in diagnostics {
        diag.render(filename, source);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_construction() {
        let d = Diagnostic::error("unknown call name".to_string(), Span::new(4, 12));
        assert_eq!(d.severity, Severity::Error);
        assert_eq!(d.message, "unknown call name");
        assert_eq!(d.span.start, 4);
        assert_eq!(d.span.end, 12);
        assert!(d.notes.is_empty());
        assert!(d.help.is_none());
    }

    #[test]
    fn test_with_note_and_help() {
        let d = Diagnostic::error("unresolved identifier 'y'".to_string(), Span::dummy())
            .with_note("postconditions may only reference parameters".to_string())
            .with_help("declare 'y' as a parameter of the spec".to_string());
        assert_eq!(d.notes.len(), 1);
        assert_eq!(
            d.help.as_deref(),
            Some("declare 'y' as a parameter of the spec")
        );
    }

    #[test]
    fn test_from_resolution() {
        let err = crate::synth::SpecResolutionError {
            function: "f".to_string(),
            identifier: "y".to_string(),
        };
        let d = Diagnostic::from_resolution(&err, Span::new(0, 5));
        assert_eq!(d.severity, Severity::Error);
        assert!(d.message.contains("unresolved identifier 'y'"));
        assert_eq!(d.notes.len(), 1);
    }

    #[test]
    fn test_render_does_not_panic() {
        let source = "spec increment(x: int) {\n    requires x > 0;\n}\n";
        let d = Diagnostic::error("expected ';'".to_string(), Span::new(25, 40))
            .with_note("each clause ends with a semicolon".to_string());
        d.render("test.spec", source);
    }

    #[test]
    fn test_render_diagnostics_multiple() {
        let source = "spec f() {}\nspec g() {}\n";
        let diagnostics = vec![
            Diagnostic::warning("empty spec body".to_string(), Span::new(0, 11)),
            Diagnostic::warning("empty spec body".to_string(), Span::new(12, 23)),
        ];
        render_diagnostics(&diagnostics, "test.spec", source);
    }
}
