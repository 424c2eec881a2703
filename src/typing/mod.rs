pub mod kana;
pub mod matcher;
