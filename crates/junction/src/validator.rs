//! Binding validation
//!
//! Rules, checked in order, first failure wins:
//! - output slot not yet written
//! - output slot expects a snapshot stream
//! - per binding: apply model type == output element type
//! - per binding: apply value type == input element type
//! - per binding: fixed model type == output element type
//! - per binding: resolver takes the input element type and returns the output element type
//! - per binding: a locator is set
//!
//! Validation is pure: it allocates nothing and starts nothing.

use contracts::{TypeDescriptor, ValidationError};

use crate::binding::{Binding, Locate};
use crate::model::Models;
use crate::output::OutputSlot;

/// Check that `output` and `bindings` are mutually type-consistent
///
/// Returns the first error found, or `Ok(())`.
pub fn validate(output: &OutputSlot, bindings: &[Binding]) -> Result<(), ValidationError> {
    let element = validate_output(output)?;
    for (index, binding) in bindings.iter().enumerate() {
        validate_binding(index, binding, element)?;
    }
    Ok(())
}

/// Check the output slot, returning its snapshot element type
fn validate_output(output: &OutputSlot) -> Result<TypeDescriptor, ValidationError> {
    if output.is_written() {
        return Err(ValidationError::OutputNotWritableSlot {
            content: output.content_type(),
        });
    }
    output
        .element_type()
        .ok_or_else(|| ValidationError::OutputNotStreamType {
            actual: output.content_type(),
        })
}

fn validate_binding(
    index: usize,
    binding: &Binding,
    element: TypeDescriptor,
) -> Result<(), ValidationError> {
    let input = binding.input_type();
    let apply = binding.apply_rule();

    if apply.model_type() != element {
        return Err(ValidationError::model_mismatch(
            index,
            element,
            apply.model_type(),
        ));
    }
    if apply.value_type() != input {
        return Err(ValidationError::InvalidApplySignature {
            binding: index,
            expected: input,
            actual: apply.value_type(),
        });
    }

    match binding.locator() {
        Locate::Fixed(key) if key.model_type() != element => Err(
            ValidationError::model_mismatch(index, element, key.model_type()),
        ),
        Locate::Fixed(_) => Ok(()),
        Locate::Resolved(resolver)
            if resolver.param_type() != input || resolver.model_type() != element =>
        {
            Err(ValidationError::InvalidResolverSignature {
                binding: index,
                want_param: input,
                want_model: element,
                param: resolver.param_type(),
                model: resolver.model_type(),
            })
        }
        Locate::Resolved(_) => Ok(()),
        Locate::Unset => Err(ValidationError::InvalidModelKind { binding: index }),
    }
}

/// Check that every fixed model reference belongs to `models`
pub(crate) fn validate_membership(
    models: &Models,
    bindings: &[Binding],
) -> Result<(), ValidationError> {
    for (index, binding) in bindings.iter().enumerate() {
        if let Locate::Fixed(key) = binding.locator() {
            if !models.contains(key) {
                return Err(ValidationError::UnknownModel { binding: index });
            }
        }
    }
    Ok(())
}
