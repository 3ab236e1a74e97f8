use super::*;

#[test]
fn display_prefixes_are_stable() {
    assert!(
        ReelError::validation("x")
            .to_string()
            .contains("validation error:")
    );
    assert!(ReelError::asset("x").to_string().contains("asset error:"));
    assert!(ReelError::render("x").to_string().contains("render error:"));
    assert!(
        ReelError::serde("x")
            .to_string()
            .contains("serialization error:")
    );
}

#[test]
fn missing_element_names_the_id() {
    let err = ReelError::missing_element("hero-canvas");
    assert_eq!(err.to_string(), "missing document element '#hero-canvas'");
}

#[test]
fn other_preserves_source() {
    let base = std::io::Error::other("boom");
    let err = ReelError::Other(anyhow::Error::new(base));
    assert!(err.to_string().contains("boom"));
}
