mod common;

mod deploy;
mod site;
