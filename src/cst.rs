use crate::pixels::{LabPixel, SubPixel};

pub type Xyz = [SubPixel; 3];
pub type UvPrime = [SubPixel; 2];

pub const D50: Xyz = [0.9642, 1.0, 0.8249];

// keeps u'v' finite on black pixels
const UV_EPSILON: SubPixel = 1e-5;

const LAB_EPSILON: SubPixel = 0.206_896_55; // 6/29
const LAB_KAPPA: SubPixel = 24389.0 / 27.0;

#[inline]
fn lab_f_inv(t: SubPixel) -> SubPixel {
    if t > LAB_EPSILON {
        t * t * t
    } else {
        (116.0 * t - 16.0) / LAB_KAPPA
    }
}

/// CIE L*a*b* relative to D50 to XYZ.
#[inline]
pub fn lab_to_xyz(lab: LabPixel) -> Xyz {
    let [l, a, b] = lab;
    let fy = (l + 16.0) / 116.0;
    let fx = a / 500.0 + fy;
    let fz = fy - b / 200.0;
    [
        D50[0] * lab_f_inv(fx),
        D50[1] * lab_f_inv(fy),
        D50[2] * lab_f_inv(fz),
    ]
}

/// CIE 1976 UCS chromaticity of a pixel.
#[inline]
pub fn xyz_to_uv_prime(xyz: Xyz) -> UvPrime {
    let [x, y, z] = xyz;
    let denominator = x + 15.0 * y + 3.0 * z + UV_EPSILON;
    [(4.0 * x) / denominator, (9.0 * y) / denominator]
}

#[inline]
pub fn lab_to_uv_prime(lab: LabPixel) -> UvPrime {
    xyz_to_uv_prime(lab_to_xyz(lab))
}

/// u'v' of the D50 white point. No epsilon here: the white point is never
/// degenerate.
pub fn white_uv_prime() -> UvPrime {
    let [x, y, z] = D50;
    let denominator = x + 15.0 * y + 3.0 * z;
    [(4.0 * x) / denominator, (9.0 * y) / denominator]
}
