use crate::common::types::Sample;

/// Lazy walk over stored samples in insertion order. Cloning it, or asking the owner
/// for a new one, starts over from the first sample.
#[derive(Debug, Clone)]
pub struct SampleSliceIter<'a> {
    idx: usize,
    samples: &'a [Sample],
}

impl<'a> SampleSliceIter<'a> {
    pub fn new(samples: &'a [Sample]) -> Self {
        SampleSliceIter { idx: 0, samples }
    }

    pub fn rewind(&mut self) {
        self.idx = 0;
    }
}

impl<'a> Iterator for SampleSliceIter<'a> {
    type Item = Sample;

    fn next(&mut self) -> Option<Self::Item> {
        if self.idx >= self.samples.len() {
            return None;
        }
        let sample = self.samples[self.idx];
        self.idx += 1;
        Some(sample)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.samples.len().saturating_sub(self.idx);
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for SampleSliceIter<'_> {}
