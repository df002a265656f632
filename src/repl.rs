use rustyline::validate::{ValidationContext, ValidationResult, Validator};
use rustyline::Result;
use rustyline::{Completer, Helper, Highlighter, Hinter};

/// Helper that extends editor
///
/// Currently only implements `Validator` trait to trigger multiline editing when a `\` is seen at
/// the end of a line or a `{` is still open.
#[derive(Completer, Helper, Highlighter, Hinter)]
pub struct ReplHelper {}

impl ReplHelper {
    pub fn new() -> Self {
        ReplHelper {}
    }
}

fn open_braces(input: &str) -> bool {
    let opened = input.matches('{').count();
    let closed = input.matches('}').count();
    opened > closed
}

impl Validator for ReplHelper {
    fn validate(&self, ctx: &mut ValidationContext) -> Result<ValidationResult> {
        let input = ctx.input();
        if input.ends_with('\\') || open_braces(input) {
            Ok(ValidationResult::Incomplete)
        } else {
            Ok(ValidationResult::Valid(None))
        }
    }
}

/// Fixup input so the parser is happy
///
/// Currently does two things:
/// * Remove the multiline escape created by `ReplHelper`
/// * Appends a `;` if the input does not already end a statement, so `print(x)` works
pub fn fixup_input(input: &str) -> String {
    let mut ret = input.replace("\\\n", " ");
    let trimmed = ret.trim_end();
    if !trimmed.is_empty() && !trimmed.ends_with(';') && !trimmed.ends_with('}') {
        ret += ";";
    }

    ret
}

#[test]
fn test_fixup_input() {
    assert_eq!(fixup_input("x = 1 \\\n+ 2"), "x = 1  + 2;");
    assert_eq!(fixup_input("print(x)"), "print(x);");
    assert_eq!(fixup_input("print(x);"), "print(x);");
    assert_eq!(fixup_input("print(x) ;  "), "print(x) ;  ");
    assert_eq!(fixup_input("{ x = 1; }"), "{ x = 1; }");
    assert_eq!(fixup_input("   "), "   ");
}

#[test]
fn test_open_braces() {
    assert!(open_braces("{ x = 1;"));
    assert!(open_braces("{ { } "));
    assert!(!open_braces("{ x = 1; }"));
    assert!(!open_braces("x = 1;"));
}
