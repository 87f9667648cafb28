pub mod chunk;
pub mod cjk;
pub mod decay;
pub mod hybrid;
pub mod keywords;
pub mod lexical;
pub mod mmr;
pub mod ranking;
pub mod similarity;
