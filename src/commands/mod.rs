pub mod check;
pub mod repl;
pub mod run;
pub mod to_bf;
pub mod to_inm;
