mod sample_slice_iterator;

pub use sample_slice_iterator::SampleSliceIter;
