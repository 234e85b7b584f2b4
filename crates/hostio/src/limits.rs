use std::time::Duration;

/// Compiled-in bounds, overridable from the environment so tests can run
/// against a smaller table or a faster quantum without touching the
/// defaults everything else relies on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Limits {
    pub max_tls_areas: usize,
    pub max_threads: usize,
    pub stack_size: usize,
    pub quantum: Duration,
}

impl Limits {
    pub const DEFAULT: Limits = Limits {
        max_tls_areas: 128,
        max_threads: 128,
        stack_size: 32 * 1024,
        quantum: Duration::from_millis(50),
    };

    /// Reads `KEOS_LAB_MAX_TLS_AREAS`, `KEOS_LAB_MAX_THREADS`,
    /// `KEOS_LAB_STACK_SIZE` and `KEOS_LAB_QUANTUM_MS`, falling back to
    /// [`Limits::DEFAULT`] for anything unset or unparsable.
    pub fn from_env() -> Limits {
        let mut limits = Limits::DEFAULT;
        if let Some(v) = env_usize("KEOS_LAB_MAX_TLS_AREAS") {
            limits.max_tls_areas = v;
        }
        if let Some(v) = env_usize("KEOS_LAB_MAX_THREADS") {
            limits.max_threads = v;
        }
        if let Some(v) = env_usize("KEOS_LAB_STACK_SIZE") {
            limits.stack_size = v;
        }
        if let Some(v) = env_usize("KEOS_LAB_QUANTUM_MS") {
            limits.quantum = Duration::from_millis(v as u64);
        }
        limits
    }
}

impl Default for Limits {
    fn default() -> Self {
        Limits::DEFAULT
    }
}

fn env_usize(key: &str) -> Option<usize> {
    std::env::var(key).ok()?.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_spec_bounds() {
        assert_eq!(Limits::DEFAULT.max_tls_areas, 128);
        assert_eq!(Limits::DEFAULT.max_threads, 128);
        assert_eq!(Limits::DEFAULT.stack_size, 32 * 1024);
        assert_eq!(Limits::DEFAULT.quantum, Duration::from_millis(50));
    }

    #[test]
    fn env_override_parses() {
        std::env::set_var("KEOS_LAB_MAX_TLS_AREAS", "4");
        let limits = Limits::from_env();
        assert_eq!(limits.max_tls_areas, 4);
        std::env::remove_var("KEOS_LAB_MAX_TLS_AREAS");
    }
}
