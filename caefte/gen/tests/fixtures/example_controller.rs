//! Example service used by the integration tests.

use routes::{get, post};

#[derive(Default)]
pub struct ExampleController;

impl ExampleController {
    #[get("/api/rng")]
    pub fn rng(&self) -> i32 {
        4
    }

    #[get("/api/async_rng", api_name = "SlowerRng")]
    pub async fn async_rng(&self) -> i32 {
        -17
    }

    #[get(path = "/api/files")]
    pub fn files(&self) -> Vec<String> {
        vec!["a.txt".to_string(), "b.txt".to_string(), "ü.md".to_string()]
    }

    #[post("/api/recent")]
    pub async fn recent(&self) -> [String; 2] {
        ["latest".to_string(), String::new()]
    }

    #[get("/api/groups")]
    pub fn groups() -> Vec<Vec<String>> {
        vec![vec!["x".to_string()], vec![]]
    }

    #[get("/api/flags")]
    pub fn flags(&self) -> Box<[bool]> {
        vec![true, false, true].into_boxed_slice()
    }

    #[get("/api/version")]
    pub fn version() -> &'static str {
        "1.2.3"
    }

    #[get("/api/initial")]
    pub fn initial(&self) -> char {
        'Z'
    }

    #[get("/api/ratio")]
    pub fn ratio(&self) -> f64 {
        0.625
    }

    pub fn helper(&self) -> u8 {
        0
    }
}
