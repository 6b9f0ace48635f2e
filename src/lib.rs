pub mod app;
pub mod config;
pub mod db;
pub mod error;
pub mod policy;
pub mod state;

pub mod crypto {
    pub mod aes;
    pub mod password;
}

pub mod session {
    pub mod codec;
    pub mod revocation;
    pub mod store;
    pub mod transport;
}

pub mod models {
    pub mod agent;
    pub mod citoyen;
    pub mod demande;
    pub mod session;
}

pub mod repositories {
    pub mod agent;
    pub mod citoyen;
    pub mod demande;
    pub mod memory;
}

pub mod services {
    pub mod auth;
    pub mod demandes;
}

pub mod handlers {
    pub mod auth;
    pub mod demandes;
}

pub mod middleware_layer {
    pub mod auth;
}

pub mod validation {
    pub mod auth;
    pub mod demande;
    pub mod fields;

    pub use self::fields::*;
}
