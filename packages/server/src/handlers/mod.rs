pub mod deploy;
pub mod site;
