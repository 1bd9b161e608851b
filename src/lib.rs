pub mod app;
pub mod config;
pub mod error;
pub mod keys;
pub mod api {
    pub mod blog;
    pub mod errors;
    pub mod health;
    pub mod json;
    pub mod leetcode;
    pub mod playbook;
    pub mod upload;
}
pub mod auth {
    pub mod middleware;
    pub mod models;
    pub mod verifier;
}
pub mod db {
    pub mod models;
    pub mod repository;
    pub mod update;
}
pub mod leetcode {
    pub mod client;
}
pub mod storage {
    pub mod client;
}
