pub mod alliance_selection;
pub mod participant;
pub mod quals_match;
