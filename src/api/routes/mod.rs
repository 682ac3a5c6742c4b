pub mod betters;
pub mod bets;
pub mod competitions;
pub mod competitors;
pub mod ws;
