//! Probe port codec
//!
//! Declarative and transport models carry a probe port as a string; the
//! platform uses `IntOrString`. Numeric strings become integers.

use k8s_openapi::apimachinery::pkg::util::intstr::IntOrString;

pub fn port_from_string(port: &str) -> IntOrString {
    match port.parse::<i32>() {
        Ok(n) => IntOrString::Int(n),
        Err(_) => IntOrString::String(port.to_string()),
    }
}

pub fn port_to_string(port: &IntOrString) -> String {
    match port {
        IntOrString::Int(n) => n.to_string(),
        IntOrString::String(s) => s.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numeric_port_becomes_int() {
        assert_eq!(port_from_string("8080"), IntOrString::Int(8080));
        assert_eq!(port_to_string(&IntOrString::Int(8080)), "8080");
    }

    #[test]
    fn test_named_port_stays_string() {
        assert_eq!(port_from_string("http"), IntOrString::String("http".to_string()));
        assert_eq!(port_to_string(&IntOrString::String("http".to_string())), "http");
    }
}
