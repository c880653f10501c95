use super::*;

#[test]
fn scalar_and_vector_values_interpolate() {
    assert_eq!(
        Value::lerp(Value::Scalar(90.0), Value::Scalar(45.0), 0.5),
        Value::Scalar(67.5)
    );
    let v = Value::lerp(
        Value::Vec3(Vec3::new(0.0, 0.0, 0.0)),
        Value::Vec3(Vec3::new(2.0, -4.0, 8.0)),
        0.25,
    );
    assert_eq!(v.as_vec3(), Some(Vec3::new(0.5, -1.0, 2.0)));
}

#[test]
fn flags_hold_until_the_end() {
    let a = Value::Flag(false);
    let b = Value::Flag(true);
    assert_eq!(Value::lerp(a, b, 0.99), a);
    assert_eq!(Value::lerp(a, b, 1.0), b);
}

#[test]
fn accessors_reject_other_kinds() {
    assert_eq!(Value::Scalar(1.0).as_vec3(), None);
    assert_eq!(Value::Flag(true).as_scalar(), None);
    assert_eq!(Value::Flag(true).as_flag(), Some(true));
}
