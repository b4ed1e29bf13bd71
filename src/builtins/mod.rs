pub mod cd;
pub mod chatroom;
pub mod echo;
pub mod help;
pub mod mycp;
pub mod palindrome;
pub mod registry;
pub mod uniq;
