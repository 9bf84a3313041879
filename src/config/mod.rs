pub mod mlem;
