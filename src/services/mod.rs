pub mod corpus;
pub mod corpus_loader;
pub mod datamuse;
pub mod generator;
pub mod rhyme_index;
