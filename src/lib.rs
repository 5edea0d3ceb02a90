pub mod config;

pub mod core {
    pub mod cache;
    pub mod cms;
    pub mod dates;
    pub mod html_text;
    pub mod normalizer;
    pub mod prober;
}

pub mod error {
    pub mod cms;
}

pub mod http {
    pub mod client;
    pub mod logging_middleware;
    pub mod no_cache_middleware;
}

pub mod model {
    pub mod course;
    pub mod menu;
    pub mod page;
    pub mod raw_course;
    pub mod sync_report;
}

pub mod server {
    pub mod sync;
}
