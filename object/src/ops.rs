//! Baseline attribute operation implementations.
//!
//! See the [`dcmforge_core::ops`] module
//! for more information.

use dcmforge_core::Tag;
use dcmforge_core::ops::{ApplyOp, AttributeOp, AttributeSelector, AttributeSelectorStep};
use dcmforge_core::value::{ModifyValueError, ValueType};
use snafu::Snafu;

use crate::FileDicomObject;

/// An error which may occur when applying an attribute operation to an object.
#[derive(Debug, Snafu)]
#[non_exhaustive]
#[snafu(visibility(pub(crate)))]
pub enum ApplyError {
    /// Missing itermediate sequence for {selector} at step {step_index}
    MissingSequence {
        selector: AttributeSelector,
        step_index: u32,
    },
    /// Step {step_index} for {selector} is not a data set sequence 
    NotASequence {
        selector: AttributeSelector,
        step_index: u32,
    },
    /// Incompatible source element type {kind:?} for extension
    IncompatibleTypes {
        /// the source element value type
        kind: ValueType,
    },
    /// Illegal removal of mandatory attribute
    Mandatory,
    /// Could not modify source element type through extension
    Modify { source: ModifyValueError },
    /// Illegal extension of fixed cardinality attribute
    IllegalExtend,
    /// Unsupported action
    UnsupportedAction,
    /// Unsupported attribute insertion
    UnsupportedAttribute,
}

/// Result type for when applying attribute operations to an object.
pub type ApplyResult<T = (), E = ApplyError> = std::result::Result<T, E>;

/// Decide whether an element's value is large enough that a caller
/// streaming a data set should divert it to external (bulkdata) storage
/// instead of inlining it into the in-memory object.
///
/// This is a plain threshold check, not a parser hook: a caller wanting
/// bulkdata diversion reads the data set with a raw/undecoded value
/// strategy and calls this function per element to decide what to
/// externalize, rather than the decoder invoking a sink mid-parse.
///
/// `private_threshold` bounds elements under a private tag
/// ([`Tag::is_private_value`] plus odd-group, non-creator elements);
/// `public_threshold` bounds everything else. Pixel Data and other
/// `OB`/`OW`/`UN` elements are the usual candidates, but this function
/// does not special-case any particular VR: it only compares `length`
/// against the applicable threshold.
pub fn should_divert_to_bulkdata(
    tag: Tag,
    length: u32,
    private_threshold: u32,
    public_threshold: u32,
) -> bool {
    let threshold = if tag.group() % 2 == 1 && tag.element() >= 0x0100 {
        private_threshold
    } else {
        public_threshold
    };
    length > threshold
}


impl<T> ApplyOp for FileDicomObject<T>
where
    T: ApplyOp<Err = ApplyError>,
{
    type Err = ApplyError;

    /// Apply the given attribute operation on this object.
    ///
    /// The operation is delegated to the file meta table
    /// if the selector root tag is in group `0002`,
    /// and to the underlying object otherwise.
    ///
    /// See the [`dcmforge_core::ops`] module
    /// for more information.
    fn apply(&mut self, op: AttributeOp) -> ApplyResult {
        if let AttributeSelectorStep::Tag(Tag(0x0002, _)) = op.selector.first_step() {
            self.meta.apply(op)
        } else {
            self.obj.apply(op)
        }
    }
}
