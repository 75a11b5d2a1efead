pub mod access;
pub mod campaigns;
pub mod health;
pub mod interactions;
pub mod pages;
mod request_meta;
pub mod users;

#[cfg(test)]
mod tests;
