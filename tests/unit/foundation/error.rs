use super::*;

#[test]
fn display_prefixes_are_stable() {
    assert!(
        SwarmError::validation("x")
            .to_string()
            .contains("validation error:")
    );
    assert!(SwarmError::raster("x").to_string().contains("raster error:"));
    assert!(
        SwarmError::schedule("x")
            .to_string()
            .contains("schedule error:")
    );
    assert!(SwarmError::render("x").to_string().contains("render error:"));
    assert!(SwarmError::encode("x").to_string().contains("encode error:"));
    assert!(
        SwarmError::serde("x")
            .to_string()
            .contains("serialization error:")
    );
}

#[test]
fn other_preserves_source() {
    let base = std::io::Error::other("boom");
    let err = SwarmError::Other(anyhow::Error::new(base));
    assert!(err.to_string().contains("boom"));
}

#[test]
fn json_errors_map_to_serde() {
    let err: SwarmError = serde_json::from_str::<u32>("nope").unwrap_err().into();
    assert!(matches!(err, SwarmError::Serde(_)));
}
