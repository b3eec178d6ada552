//! Handling of encapsulated pixel data, which is transmitted as a sequence
//! of compressed fragments rather than as a single primitive value.
use crate::value::C;

/// The smallest unit of pixel data fragment storage used by an
/// in-memory DICOM object: an owned byte buffer.
pub type InMemFragment = Vec<u8>;

/// An encapsulated pixel data sequence: a Basic Offset Table alongside
/// the sequence of compressed fragments that follow it.
///
/// `P` is the encapsulated pixel data provider, which should usually
/// implement `AsRef<[u8]>`.
#[derive(Debug, Clone, PartialEq)]
pub struct PixelFragmentSequence<P> {
    /// The Basic Offset Table: one entry per frame, each being the byte
    /// offset (relative to the first byte of the first fragment) at which
    /// that frame's data begins. May be empty when the offset table item
    /// carries no data (e.g. only one frame, or an encoder that chose not
    /// to produce one).
    offset_table: C<u32>,
    /// The sequence of compressed fragments, in encoding order.
    fragments: C<P>,
}

impl<P> PixelFragmentSequence<P> {
    /// Build a pixel fragment sequence from a Basic Offset Table and a
    /// list of fragments.
    ///
    /// This function does not validate the offset table against the
    /// fragments: the number of offset table entries need not match the
    /// number of fragments, since a single frame may be split over several
    /// fragments.
    pub fn new(offset_table: C<u32>, fragments: C<P>) -> Self {
        PixelFragmentSequence {
            offset_table,
            fragments,
        }
    }

    /// Build a pixel fragment sequence from a list of fragments alone,
    /// with an empty offset table.
    pub fn new_fragments<T>(fragments: T) -> Self
    where
        T: Into<C<P>>,
    {
        PixelFragmentSequence {
            offset_table: C::new(),
            fragments: fragments.into(),
        }
    }

    /// Obtain a reference to the Basic Offset Table.
    pub fn offset_table(&self) -> &[u32] {
        &self.offset_table
    }

    /// Obtain a reference to the fragments.
    pub fn fragments(&self) -> &[P] {
        &self.fragments
    }

    /// Obtain a mutable reference to the fragments.
    pub fn fragments_mut(&mut self) -> &mut C<P> {
        &mut self.fragments
    }

    /// Decompose this value into the offset table and the fragments.
    pub fn into_parts(self) -> (C<u32>, C<P>) {
        (self.offset_table, self.fragments)
    }

    /// Checks whether there are no fragments.
    pub fn is_empty(&self) -> bool {
        self.fragments.is_empty()
    }
}

/// Represents the fragments that a single frame of pixel data was split
/// into, as produced when encapsulating a raw frame buffer.
///
/// A [`PixelFragmentSequence`] can be built from a list of [`Fragments`],
/// one per frame. For multi-frame pixel data, each frame is expected to
/// be encapsulated into exactly one fragment, as recommended by
/// PS3.5 Annex A.4.
///
/// # Example
///
/// ```
/// use dcmforge_core::value::fragments::Fragments;
/// use dcmforge_core::value::PixelFragmentSequence;
///
/// // Single 512x512 frame
/// let frames = vec![vec![0; 262144]];
/// let fragments = frames
///     .into_iter()
///     .map(|frame| Fragments::new(frame, 0))
///     .collect::<Vec<Fragments>>();
///
/// let seq: PixelFragmentSequence<Vec<u8>> = fragments.into();
/// assert_eq!(seq.fragments().len(), 1);
/// ```
#[derive(Debug)]
pub struct Fragments {
    fragments: Vec<InMemFragment>,
}

impl Fragments {
    /// Split `data` into one or more same-sized fragments.
    ///
    /// A `fragment_size` of 0 means the whole buffer becomes a single
    /// fragment. Fragment sizes are always rounded up to an even number
    /// of bytes, padding the final fragment with zeroes if necessary,
    /// as mandated by the DICOM standard for encapsulated pixel data.
    pub fn new(data: Vec<u8>, fragment_size: u32) -> Self {
        let fragment_size: u32 = if fragment_size == 0 {
            data.len() as u32
        } else {
            fragment_size
        };

        let fragment_size = if fragment_size % 2 == 0 {
            fragment_size
        } else {
            fragment_size + 1
        };

        if fragment_size == 0 {
            return Fragments { fragments: vec![] };
        }

        let number_of_fragments = (data.len() as f32 / fragment_size as f32).ceil() as u32;

        let mut data = data;
        let encapsulated_size = (fragment_size * number_of_fragments) as usize;
        if encapsulated_size > data.len() {
            data.resize(encapsulated_size, 0);
        }

        let fragments = data
            .chunks_exact(fragment_size as usize)
            .map(|fragment| fragment.to_vec())
            .collect::<Vec<InMemFragment>>();

        Fragments { fragments }
    }

    /// Checks whether this frame produced no fragments at all.
    pub fn is_empty(&self) -> bool {
        self.fragments.is_empty()
    }

    /// Checks whether this frame was split into more than one fragment.
    pub fn is_multiframe(&self) -> bool {
        self.fragments.len() > 1
    }

    /// The total encapsulated byte length of this frame's fragments,
    /// including the 8-byte item header of each fragment.
    pub fn len(&self) -> u32 {
        self.fragments
            .iter()
            .fold(0u32, |acc, fragment| acc + fragment.len() as u32 + 8u32)
    }
}

impl From<Vec<Fragments>> for PixelFragmentSequence<Vec<u8>> {
    fn from(value: Vec<Fragments>) -> Self {
        let is_multiframe = value.len() > 1;

        let mut offset_table = C::with_capacity(value.len());
        let mut current_offset = 0u32;
        let mut fragments = Vec::new();

        for frame in value {
            if frame.is_multiframe() && is_multiframe {
                panic!("more than 1 fragment per frame is invalid for multi-frame pixel data");
            }

            offset_table.push(current_offset);
            current_offset += frame.len();

            fragments.extend(frame.fragments);
        }

        PixelFragmentSequence {
            offset_table,
            fragments: C::from_vec(fragments),
        }
    }
}
