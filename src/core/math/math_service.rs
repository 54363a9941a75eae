use super::evaluator;
use super::expression::{self, MathError};

/// What a `/math` invocation produced.
#[derive(Debug, Clone, PartialEq)]
pub enum MathOutcome {
    Evaluated {
        parsed: String,
        result: String,
    },
    /// `echo` is the parsed form when parsing succeeded, otherwise the raw input.
    Failed {
        echo: String,
        error: MathError,
    },
}

/// Reply text plus whether only the invoking user should see it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MathReply {
    pub content: String,
    pub ephemeral: bool,
}

/// Parse and evaluate one expression.
pub fn evaluate(input: &str) -> MathOutcome {
    let parsed = match expression::parse(input) {
        Ok(expr) => expr,
        Err(error) => {
            return MathOutcome::Failed {
                echo: input.trim().to_string(),
                error,
            }
        }
    };

    match evaluator::eval(&parsed) {
        Ok(value) => MathOutcome::Evaluated {
            parsed: parsed.to_string(),
            result: expression::format_number(value),
        },
        Err(error) => MathOutcome::Failed {
            echo: parsed.to_string(),
            error,
        },
    }
}

impl MathOutcome {
    pub fn reply(&self) -> MathReply {
        match self {
            MathOutcome::Evaluated { parsed, result } => MathReply {
                content: format!("{} = **{}**", parsed, result),
                ephemeral: false,
            },
            MathOutcome::Failed { echo, error } => MathReply {
                content: format!("{}\n```js\n{}: {}\n```", echo, error.kind(), error),
                ephemeral: true,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn simple_sum_replies_publicly() {
        let reply = evaluate("2 + 2").reply();

        assert!(!reply.ephemeral);
        assert!(reply.content.contains("2 + 2 = **4**"));
    }

    #[test]
    fn unspaced_input_is_echoed_normalized() {
        let reply = evaluate("10/4").reply();
        assert_eq!(reply.content, "10 / 4 = **2.5**");
    }

    #[test]
    fn incomplete_expression_replies_privately_with_error_block() {
        let reply = evaluate("2 +").reply();

        assert!(reply.ephemeral);
        assert!(reply.content.starts_with("2 +\n```js\n"));
        assert!(reply
            .content
            .contains("SyntaxError: Unexpected end of expression (char 4)"));
        assert!(reply.content.ends_with("```"));
    }

    #[test]
    fn evaluation_failure_echoes_parsed_form() {
        let outcome = evaluate("1+foo");

        assert_eq!(
            outcome,
            MathOutcome::Failed {
                echo: "1 + foo".to_string(),
                error: MathError::UndefinedSymbol("foo".to_string()),
            }
        );

        let reply = outcome.reply();
        assert!(reply.ephemeral);
        assert_eq!(reply.content, "1 + foo\n```js\nError: Undefined symbol foo\n```");
    }

    #[test]
    fn deeply_nested_input_fails_instead_of_overflowing() {
        let input = format!("{}1{}", "(".repeat(2999), ")".repeat(2999));
        let outcome = evaluate(&input);

        let MathOutcome::Failed { echo, error } = &outcome else {
            panic!("expected a failure, got {:?}", outcome);
        };
        assert_eq!(echo, &input);
        assert!(matches!(error, MathError::Syntax { .. }));

        let reply = outcome.reply();
        assert!(reply.ephemeral);
        assert!(reply.content.contains("SyntaxError: Maximum nesting depth exceeded"));
    }
}
