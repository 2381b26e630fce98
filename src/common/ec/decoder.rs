use tracing::trace;

use crate::common::{
    error::{QRError, QRResult},
    galois::{Polynomial, G},
};

// Reed-Solomon decoder
//------------------------------------------------------------------------------

pub struct ReedSolomonDecoder;

impl ReedSolomonDecoder {
    // Corrects `received` (data followed by `ec_len` ecc codewords) in place and
    // returns the number of corrected codewords. On failure `received` is left as is.
    pub fn decode(received: &mut [u8], ec_len: usize) -> QRResult<usize> {
        debug_assert!(ec_len > 0 && ec_len < received.len(), "Invalid ecc length {ec_len}");
        debug_assert!(received.len() <= 255, "Block exceeds field size: {}", received.len());

        let synd = match syndromes(received, ec_len) {
            Ok(()) => return Ok(0),
            Err(s) => s,
        };

        // Error locator
        let (sig, l) = berlekamp_massey(&synd);
        if 2 * l > ec_len {
            return Err(QRError::TooManyError);
        }
        let sigma = Polynomial::new(sig.into_iter().rev().collect());

        // Error evaluator
        let omg = omega(&synd, &sigma);

        let err_pos = chien_search(&sigma, received.len());
        if err_pos.len() != l {
            trace!("Locator roots don't match degree: Roots {}, Degree {l}", err_pos.len());
            return Err(QRError::TooManyError);
        }

        let err_mag = forney(&omg, &sigma.derivative(), &err_pos, received.len())?;

        for (&i, &m) in err_pos.iter().zip(err_mag.iter()) {
            received[i] = (G(received[i]) + m).into();
        }

        if syndromes(received, ec_len).is_err() {
            for (&i, &m) in err_pos.iter().zip(err_mag.iter()) {
                received[i] = (G(received[i]) + m).into();
            }
            return Err(QRError::TooManyError);
        }

        Ok(err_pos.len())
    }
}

// S_j = R(α^j) for j in 0..ec_len
fn syndromes(received: &[u8], ec_len: usize) -> Result<(), Vec<G>> {
    let synd: Vec<G> = (0..ec_len)
        .map(|j| {
            let x = G::gen_pow(j);
            received.iter().fold(G::ZERO, |acc, &b| acc * x + G(b))
        })
        .collect();

    if synd.iter().all(|s| s.is_zero()) {
        Ok(())
    } else {
        Err(synd)
    }
}

// Sigma polynomial, lowest degree first, with its degree
fn berlekamp_massey(synd: &[G]) -> (Vec<G>, usize) {
    let n = synd.len();
    let mut l = 0usize;
    let mut m = 1usize;
    let mut b = G::ONE;
    let mut cx = vec![G::ZERO; n + 1];
    let mut bx = vec![G::ZERO; n + 1];
    cx[0] = G::ONE;
    bx[0] = G::ONE;

    for k in 0..n {
        // Discrepancy
        let mut d = synd[k];
        for i in 1..=l {
            d += cx[i] * synd[k - i];
        }

        if d.is_zero() {
            m += 1;
            continue;
        }

        let tx = cx.clone();
        let scale = d / b;
        for i in 0..=n - m {
            cx[i + m] += scale * bx[i];
        }

        if 2 * l <= k {
            bx = tx;
            l = k + 1 - l;
            b = d;
            m = 1;
        } else {
            m += 1;
        }
    }
    (cx, l)
}

// Omega = S * sigma mod x^ec_len
fn omega(synd: &[G], sigma: &Polynomial) -> Polynomial {
    let prod = Polynomial::new(synd.iter().rev().copied().collect()).multiply(sigma);
    Polynomial::new((0..synd.len()).rev().map(|d| prod.coefficient(d)).collect())
}

// Indices into the codeword whose locator X^-1 is a root of sigma
fn chien_search(sigma: &Polynomial, len: usize) -> Vec<usize> {
    (0..len)
        .filter(|&i| {
            let e = len - 1 - i;
            sigma.evaluate(G::gen_pow(255 - e)).is_zero()
        })
        .collect()
}

// e = X * omega(X^-1) / sigma'(X^-1)
fn forney(
    omg: &Polynomial,
    dsigma: &Polynomial,
    err_pos: &[usize],
    len: usize,
) -> QRResult<Vec<G>> {
    err_pos
        .iter()
        .map(|&i| {
            let e = len - 1 - i;
            let x = G::gen_pow(e);
            let xinv = G::gen_pow(255 - e);
            let den = dsigma.evaluate(xinv);
            if den.is_zero() {
                return Err(QRError::TooManyError);
            }
            Ok(x * omg.evaluate(xinv) / den)
        })
        .collect()
}


// Format & version info
//------------------------------------------------------------------------------

// Nearest valid codeword to any of the readings, if within `max_errors` bits
pub fn rectify_info(readings: &[u32], valid: &[u32], max_errors: u32) -> Option<u32> {
    let mut best = None;
    let mut best_dist = max_errors + 1;
    for &r in readings {
        for &v in valid {
            let dist = (r ^ v).count_ones();
            if dist < best_dist {
                best = Some(v);
                best_dist = dist;
            }
        }
    }
    best
}

#[cfg(test)]
mod rectify_info_tests {
    use super::rectify_info;

    const VALID: [u32; 4] = [0b0000_0000, 0b0000_1111, 0b1111_0000, 0b1111_1111];

    #[test]
    fn test_rectify_info() {
        assert_eq!(rectify_info(&[0b0000_1111], &VALID, 1), Some(0b0000_1111));
        assert_eq!(rectify_info(&[0b0000_1110], &VALID, 1), Some(0b0000_1111));
        assert_eq!(rectify_info(&[0b0011_0000], &VALID, 1), None);
        assert_eq!(rectify_info(&[0b0011_0000, 0b1110_1111], &VALID, 1), Some(0b1111_1111));
    }
}
