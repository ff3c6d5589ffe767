pub mod dispatch;

mod config;
mod debug;
mod document;
mod draft;
mod final_doc;
mod methodology;
mod outline;
mod paper;
mod project;
mod shared;
mod sources;
mod thesis;
