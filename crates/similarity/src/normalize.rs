use crate::SimilarityError;

/// In-place L2 normalization. Zero vectors are left untouched.
pub fn l2_normalize_in_place(v: &mut [f32]) {
    if let Some(inv_norm) = inverse_norm(v) {
        for x in v.iter_mut() {
            *x = (f64::from(*x) * inv_norm) as f32;
        }
    }
}

/// `1 / ||v||`, summed in f64 so no finite f32 input overflows or underflows.
fn inverse_norm(v: &[f32]) -> Option<f64> {
    let norm_sq: f64 = v.iter().map(|&x| f64::from(x) * f64::from(x)).sum();
    (norm_sq > 0.0 && norm_sq.is_finite()).then(|| norm_sq.sqrt().recip())
}

/// Returns a unit-length copy of `v`, rejecting vectors that cannot be normalized.
///
/// `what` names the vector in the error message (e.g. `"image vector"`).
pub(crate) fn to_unit(v: &[f32], what: &str) -> Result<Vec<f32>, SimilarityError> {
    if v.is_empty() {
        return Err(SimilarityError::InvalidInput(format!("{what} is empty")));
    }
    if v.iter().any(|x| !x.is_finite()) {
        return Err(SimilarityError::InvalidInput(format!(
            "{what} contains non-finite values"
        )));
    }
    let Some(inv_norm) = inverse_norm(v) else {
        return Err(SimilarityError::InvalidInput(format!("{what} has zero norm")));
    };
    let out: Vec<f32> = v
        .iter()
        .map(|&x| (f64::from(x) * inv_norm) as f32)
        .collect();
    if out.iter().all(|&x| x == 0.0) || out.iter().any(|x| !x.is_finite()) {
        return Err(SimilarityError::InvalidInput(format!(
            "{what} cannot be normalized"
        )));
    }
    Ok(out)
}

#[inline]
pub(crate) fn dot(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn norm(v: &[f32]) -> f32 {
        v.iter().map(|x| x * x).sum::<f32>().sqrt()
    }

    #[test]
    fn l2_normalize_simple_vector() {
        let mut v = vec![3.0f32, 4.0];
        l2_normalize_in_place(&mut v);
        assert!((v[0] - 0.6).abs() < 1e-6);
        assert!((v[1] - 0.8).abs() < 1e-6);
    }

    #[test]
    fn l2_normalize_zero_vector_is_untouched() {
        let mut v = vec![0.0f32; 4];
        l2_normalize_in_place(&mut v);
        assert_eq!(v, vec![0.0; 4]);
    }

    #[test]
    fn to_unit_has_unit_length() {
        let v = to_unit(&[1.0, -2.0, 3.0, 4.0, 5.0], "image vector").unwrap();
        assert!((norm(&v) - 1.0).abs() < 1e-5);
    }

    #[test]
    fn to_unit_handles_huge_components() {
        let v = to_unit(&[1e20, 1e18], "image vector").unwrap();
        assert!((norm(&v) - 1.0).abs() < 1e-5);
        assert!((v[0] - 0.99995).abs() < 1e-5);
        assert!((v[1] - 0.0099995).abs() < 1e-6);

        let v = to_unit(&[f32::MAX, f32::MAX], "image vector").unwrap();
        assert!((v[0] - std::f32::consts::FRAC_1_SQRT_2).abs() < 1e-6);
    }

    #[test]
    fn to_unit_handles_tiny_components() {
        let v = to_unit(&[1e-20, 1e-22], "image vector").unwrap();
        assert!((norm(&v) - 1.0).abs() < 1e-5);
        assert!(v[0] > 0.999);

        let v = to_unit(&[f32::from_bits(1), 0.0], "image vector").unwrap();
        assert_eq!(v, vec![1.0, 0.0]);
    }

    #[test]
    fn l2_normalize_near_zero_vector() {
        let mut v = vec![1e-30f32, -1e-30];
        l2_normalize_in_place(&mut v);
        assert!((v[0] - std::f32::consts::FRAC_1_SQRT_2).abs() < 1e-6);
        assert!((v[1] + std::f32::consts::FRAC_1_SQRT_2).abs() < 1e-6);
    }

    #[test]
    fn to_unit_rejects_empty() {
        let err = to_unit(&[], "image vector").unwrap_err();
        assert_eq!(
            err,
            SimilarityError::InvalidInput("image vector is empty".into())
        );
    }

    #[test]
    fn to_unit_rejects_zero_norm() {
        let err = to_unit(&[0.0, 0.0], "image vector").unwrap_err();
        assert!(matches!(err, SimilarityError::InvalidInput(msg) if msg.contains("zero norm")));
    }

    #[test]
    fn to_unit_rejects_nan() {
        let err = to_unit(&[1.0, f32::NAN], "prompt").unwrap_err();
        assert!(matches!(err, SimilarityError::InvalidInput(msg) if msg.contains("non-finite")));
    }

    #[test]
    fn dot_of_orthogonal_vectors_is_zero() {
        assert_eq!(dot(&[1.0, 0.0], &[0.0, 1.0]), 0.0);
        assert!((dot(&[0.6, 0.8], &[0.6, 0.8]) - 1.0).abs() < 1e-6);
    }
}
