//! Cross-cutting helpers shared by the recipe API crates: logging setup,
//! Prometheus metrics, startup filesystem checks and small wire types.

pub mod types;
pub mod utils;
pub mod env;
pub mod metrics;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn health_type_ok() {
        let h = types::Health::ok();
        assert_eq!(h.status, "ok");
    }
}
