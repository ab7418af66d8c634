pub mod blanks;
pub mod diff;
pub mod evaluate;
pub mod morph;
pub mod normalize;
