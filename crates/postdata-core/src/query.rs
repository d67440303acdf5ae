//! # Query Module
//!
//! Parameterized SPARQL templates and positional binding.
//!
//! - Templates are stateless `'static` definitions (see [`crate::catalog`])
//! - Binding substitutes `$1`, `$2`, ... in a single pass
//! - The parameter count is fixed per template; a mismatch is an error

use crate::PostdataError;

/// A named query with a fixed number of positional parameters.
#[derive(Debug, PartialEq, Eq)]
pub struct QueryTemplate {
    /// Unique name, also used as fixture key by the in-memory executor.
    pub name: &'static str,
    /// Human-readable purpose.
    pub description: &'static str,
    /// Exact number of positional parameters `bind` accepts.
    pub parameters: usize,
    /// SPARQL text with `$1`..`$n` placeholders.
    pub text: &'static str,
}

impl QueryTemplate {
    /// Bind positional parameters, in order.
    pub fn bind<S: AsRef<str>>(
        &'static self,
        parameters: &[S],
    ) -> Result<BoundQuery, PostdataError> {
        if parameters.len() != self.parameters {
            return Err(PostdataError::ParameterMismatch {
                query: self.name,
                expected: self.parameters,
                actual: parameters.len(),
            });
        }

        let parameters: Vec<String> = parameters
            .iter()
            .map(|p| validate_parameter(p.as_ref()).map(str::to_string))
            .collect::<Result<_, _>>()?;

        let sparql = substitute(self.text, &parameters);
        Ok(BoundQuery {
            template: self,
            parameters,
            sparql,
        })
    }
}

/// A template with its parameters substituted, ready for execution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoundQuery {
    template: &'static QueryTemplate,
    parameters: Vec<String>,
    sparql: String,
}

impl BoundQuery {
    #[must_use]
    pub fn template(&self) -> &'static QueryTemplate {
        self.template
    }

    #[must_use]
    pub fn name(&self) -> &'static str {
        self.template.name
    }

    /// The parameters in binding order.
    #[must_use]
    pub fn parameters(&self) -> &[String] {
        &self.parameters
    }

    /// The final SPARQL text.
    #[must_use]
    pub fn sparql(&self) -> &str {
        &self.sparql
    }
}

/// Reject values that would escape an IRI or prefixed-name position.
fn validate_parameter(value: &str) -> Result<&str, PostdataError> {
    let forbidden = |c: char| c.is_whitespace() || matches!(c, '<' | '>' | '"' | '{' | '}' | '\\');
    if value.is_empty() || value.contains(forbidden) {
        return Err(PostdataError::InvalidParameter(value.to_string()));
    }
    Ok(value)
}

/// Replace `$n` placeholders with `parameters[n - 1]`.
///
/// Placeholders out of range, and `$` not followed by digits, are kept verbatim.
fn substitute(text: &str, parameters: &[String]) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;

    while let Some(pos) = rest.find('$') {
        out.push_str(&rest[..pos]);
        let after = &rest[pos + 1..];
        let digits = after.bytes().take_while(u8::is_ascii_digit).count();
        let index = after[..digits]
            .parse::<usize>()
            .ok()
            .filter(|i| (1..=parameters.len()).contains(i));

        match index {
            Some(i) => {
                out.push_str(&parameters[i - 1]);
                rest = &after[digits..];
            }
            None => {
                out.push('$');
                rest = after;
            }
        }
    }

    out.push_str(rest);
    out
}

// =============================================================================
// TESTS
// =============================================================================
