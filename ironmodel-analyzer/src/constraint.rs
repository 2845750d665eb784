//! Deferred parsing of constraint bodies.
//!
//! Constraint bodies may reference any type or service of the model, so they
//! are queued while the declarations are processed and parsed only after every
//! reference has been fixed up.

use crate::error::ConstraintError;
use ironmodel_core::{ConstraintRef, DiagnosticKind, Diagnostics, Expression, Method, Model};

/// Parses the raw body of a constraint into an [`Expression`].
pub trait ConstraintParser {
    /// Parses `source`, declared by `method`, against the resolved `model`.
    ///
    /// # Errors
    /// Returns `ConstraintError` if the body can't be parsed.
    fn parse(
        &self,
        model: &Model,
        method: &Method,
        source: &str,
    ) -> Result<Expression, ConstraintError>;
}

impl<F> ConstraintParser for F
where
    F: Fn(&Model, &Method, &str) -> Result<Expression, ConstraintError>,
{
    fn parse(
        &self,
        model: &Model,
        method: &Method,
        source: &str,
    ) -> Result<Expression, ConstraintError> {
        self(model, method, source)
    }
}

/// Queue of constraints waiting to be parsed.
#[derive(Debug, Default)]
pub(crate) struct ConstraintQueue {
    pending: Vec<ConstraintRef>,
}

impl ConstraintQueue {
    pub(crate) fn push(&mut self, constraint: ConstraintRef) {
        self.pending.push(constraint);
    }

    pub(crate) fn len(&self) -> usize {
        self.pending.len()
    }

    /// Parses every queued constraint and stores the resulting expressions.
    ///
    /// Returns the number of constraints parsed successfully.
    pub(crate) fn drain(
        self,
        model: &mut Model,
        parser: Option<&dyn ConstraintParser>,
        diagnostics: &mut Diagnostics,
    ) -> usize {
        let Some(parser) = parser else {
            tracing::debug!(
                "no constraint parser configured, keeping {} constraint bodies unparsed",
                self.pending.len()
            );
            return 0;
        };

        let mut parsed = 0;
        for position in self.pending {
            let result = {
                let (Some(method), Some(constraint)) =
                    (model.method(position.method), model.constraint(position))
                else {
                    continue;
                };
                parser
                    .parse(model, method, &constraint.source)
                    .map_err(|e| (method.name().clone(), constraint.concept.name.clone(), e))
            };

            match result {
                Ok(expression) => {
                    if let Some(constraint) = model.constraint_mut(position) {
                        constraint.expression = Some(expression);
                        parsed += 1;
                    }
                }
                Err((method, constraint, error)) => diagnostics.report(
                    DiagnosticKind::ConstraintParse,
                    format!("can't parse constraint '{constraint}' of method '{method}': {error}"),
                ),
            }
        }
        parsed
    }
}
