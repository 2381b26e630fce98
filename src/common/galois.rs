use std::ops::{Add, AddAssign, Div, Mul, MulAssign, Sub};

// Galois field GF(256) with primitive polynomial x^8 + x^4 + x^3 + x^2 + 1
//------------------------------------------------------------------------------

const PRIMITIVE: u16 = 0x11d;

pub(crate) static EXP_TABLE: [u8; 512] = exp_table();

pub(crate) static LOG_TABLE: [u8; 256] = log_table();

// α^i for i in 0..512, doubled so that log sums never need a modulo
const fn exp_table() -> [u8; 512] {
    let mut table = [0; 512];
    let mut x: u16 = 1;
    let mut i = 0;
    while i < 255 {
        table[i] = x as u8;
        table[i + 255] = x as u8;
        x <<= 1;
        if x & 0x100 != 0 {
            x ^= PRIMITIVE;
        }
        i += 1;
    }
    table[510] = table[0];
    table[511] = table[1];
    table
}

const fn log_table() -> [u8; 256] {
    let exp = exp_table();
    let mut table = [0; 256];
    let mut i = 0;
    while i < 255 {
        table[exp[i] as usize] = i as u8;
        i += 1;
    }
    table
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct G(pub u8);

impl G {
    pub const ZERO: G = G(0);
    pub const ONE: G = G(1);

    // α^i, where α = 2 is the generator of the multiplicative group
    pub fn gen_pow(i: usize) -> Self {
        Self(EXP_TABLE[i % 255])
    }

    pub fn log(self) -> usize {
        debug_assert!(self.0 != 0, "Log of zero is undefined");
        LOG_TABLE[self.0 as usize] as usize
    }

    pub fn inv(self) -> Self {
        debug_assert!(self.0 != 0, "Zero has no inverse");
        Self(EXP_TABLE[255 - self.log()])
    }

    pub fn is_zero(self) -> bool {
        self.0 == 0
    }
}

impl From<G> for u8 {
    fn from(g: G) -> Self {
        g.0
    }
}

impl Add for G {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        Self(self.0 ^ rhs.0)
    }
}

impl Sub for G {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self {
        Self(self.0 ^ rhs.0)
    }
}

impl AddAssign for G {
    fn add_assign(&mut self, rhs: Self) {
        self.0 ^= rhs.0;
    }
}

impl Mul for G {
    type Output = Self;
    fn mul(self, rhs: Self) -> Self {
        if self.0 == 0 || rhs.0 == 0 {
            return Self(0);
        }
        Self(EXP_TABLE[self.log() + rhs.log()])
    }
}

impl MulAssign for G {
    fn mul_assign(&mut self, rhs: Self) {
        *self = *self * rhs;
    }
}

impl Div for G {
    type Output = Self;
    fn div(self, rhs: Self) -> Self {
        assert!(rhs.0 != 0, "Division by zero in GF(256)");
        if self.0 == 0 {
            return Self(0);
        }
        Self(EXP_TABLE[self.log() + 255 - rhs.log()])
    }
}

#[cfg(test)]
mod galois_tests {
    use super::{G, EXP_TABLE, LOG_TABLE};

    #[test]
    fn test_tables() {
        assert_eq!(EXP_TABLE[0], 1);
        assert_eq!(EXP_TABLE[8], 0x1d);
        assert_eq!(EXP_TABLE[255], 1);
        for i in 1..=255usize {
            assert_eq!(EXP_TABLE[LOG_TABLE[i] as usize] as usize, i);
        }
    }

    #[test]
    fn test_mul_div() {
        for a in 1..=255u8 {
            let a = G(a);
            assert_eq!(a * a.inv(), G::ONE);
            assert_eq!(a * G::ZERO, G::ZERO);
            for b in [1u8, 2, 3, 0x53, 0xca, 0xff] {
                let b = G(b);
                assert_eq!(a * b / b, a);
            }
        }
        assert_eq!(G(0x53) * G(0xca), G(0x8f));
    }

    #[test]
    #[should_panic]
    fn test_div_by_zero() {
        let _ = G(3) / G(0);
    }
}

// Polynomial over GF(256), coefficients stored from highest degree to lowest
//------------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Polynomial {
    coeffs: Vec<G>,
}

impl Polynomial {
    pub fn new(coeffs: Vec<G>) -> Self {
        match coeffs.iter().position(|c| !c.is_zero()) {
            Some(0) => Self { coeffs },
            Some(lead) => Self { coeffs: coeffs[lead..].to_vec() },
            None => Self::zero(),
        }
    }

    pub fn from_bytes(bytes: &[u8]) -> Self {
        Self::new(bytes.iter().map(|&b| G(b)).collect())
    }

    pub fn zero() -> Self {
        Self { coeffs: vec![G::ZERO] }
    }

    pub fn one() -> Self {
        Self { coeffs: vec![G::ONE] }
    }

    pub fn monomial(degree: usize, coeff: G) -> Self {
        if coeff.is_zero() {
            return Self::zero();
        }
        let mut coeffs = vec![G::ZERO; degree + 1];
        coeffs[0] = coeff;
        Self { coeffs }
    }

    pub fn coeffs(&self) -> &[G] {
        &self.coeffs
    }

    pub fn degree(&self) -> usize {
        self.coeffs.len() - 1
    }

    pub fn is_zero(&self) -> bool {
        self.coeffs[0].is_zero()
    }

    // Coefficient of x^degree
    pub fn coefficient(&self, degree: usize) -> G {
        if degree > self.degree() {
            return G::ZERO;
        }
        self.coeffs[self.coeffs.len() - 1 - degree]
    }

    pub fn leading(&self) -> G {
        self.coeffs[0]
    }

    // Horner's rule
    pub fn evaluate(&self, x: G) -> G {
        if x.is_zero() {
            return self.coefficient(0);
        }
        self.coeffs.iter().fold(G::ZERO, |acc, &c| acc * x + c)
    }

    pub fn add(&self, other: &Self) -> Self {
        if self.is_zero() {
            return other.clone();
        }
        if other.is_zero() {
            return self.clone();
        }

        let (small, large) = if self.coeffs.len() > other.coeffs.len() {
            (&other.coeffs, &self.coeffs)
        } else {
            (&self.coeffs, &other.coeffs)
        };
        let diff = large.len() - small.len();
        let mut sum = large[..diff].to_vec();
        sum.extend(large[diff..].iter().zip(small.iter()).map(|(&a, &b)| a + b));
        Self::new(sum)
    }

    pub fn multiply(&self, other: &Self) -> Self {
        if self.is_zero() || other.is_zero() {
            return Self::zero();
        }

        let mut prod = vec![G::ZERO; self.coeffs.len() + other.coeffs.len() - 1];
        for (i, &a) in self.coeffs.iter().enumerate() {
            for (j, &b) in other.coeffs.iter().enumerate() {
                prod[i + j] += a * b;
            }
        }
        Self::new(prod)
    }

    pub fn multiply_by_monomial(&self, degree: usize, coeff: G) -> Self {
        if coeff.is_zero() || self.is_zero() {
            return Self::zero();
        }
        let mut prod: Vec<G> = self.coeffs.iter().map(|&c| c * coeff).collect();
        prod.resize(prod.len() + degree, G::ZERO);
        Self::new(prod)
    }

    // Returns (quotient, remainder)
    pub fn divide(&self, other: &Self) -> (Self, Self) {
        assert!(!other.is_zero(), "Division by zero polynomial");

        let mut quotient = Self::zero();
        let mut remainder = self.clone();
        let inv_lead = other.leading().inv();

        while !remainder.is_zero() && remainder.degree() >= other.degree() {
            let degree_diff = remainder.degree() - other.degree();
            let scale = remainder.leading() * inv_lead;
            let term = other.multiply_by_monomial(degree_diff, scale);
            quotient = quotient.add(&Self::monomial(degree_diff, scale));
            remainder = remainder.add(&term);
        }

        (quotient, remainder)
    }

    // Formal derivative. In characteristic 2 the even-power terms vanish.
    pub fn derivative(&self) -> Self {
        let deg = self.degree();
        if deg == 0 {
            return Self::zero();
        }
        let coeffs = (0..deg)
            .rev()
            .map(|d| if (d + 1) & 1 == 1 { self.coefficient(d + 1) } else { G::ZERO })
            .collect();
        Self::new(coeffs)
    }
}

#[cfg(test)]
mod polynomial_tests {
    use super::{Polynomial, G};

    fn poly(coeffs: &[u8]) -> Polynomial {
        Polynomial::from_bytes(coeffs)
    }

    #[test]
    fn test_new_strips_leading_zeros() {
        let p = poly(&[0, 0, 3, 1]);
        assert_eq!(p.coeffs(), &[G(3), G(1)]);
        assert_eq!(p.degree(), 1);
        assert!(poly(&[0, 0]).is_zero());
        assert_eq!(poly(&[0, 0]).degree(), 0);
    }

    #[test]
    fn test_evaluate() {
        // x^2 + 3x + 2 at x = 1 over GF(2^8): 1 ^ 3 ^ 2 = 0
        let p = poly(&[1, 3, 2]);
        assert_eq!(p.evaluate(G(1)), G(0));
        assert_eq!(p.evaluate(G(0)), G(2));
        assert_eq!(p.coefficient(2), G(1));
        assert_eq!(p.coefficient(5), G(0));
    }

    #[test]
    fn test_multiply_divide() {
        let a = poly(&[7, 0, 19, 4]);
        let b = poly(&[1, 9]);
        let prod = a.multiply(&b);
        let (q, r) = prod.divide(&b);
        assert_eq!(q, a);
        assert!(r.is_zero());

        let c = prod.add(&poly(&[5]));
        let (q, r) = c.divide(&b);
        assert_eq!(q, a);
        assert_eq!(r, poly(&[5]));
    }

    #[test]
    fn test_multiply_by_monomial() {
        let p = poly(&[1, 2]);
        assert_eq!(p.multiply_by_monomial(2, G(2)), poly(&[2, 4, 0, 0]));
        assert!(p.multiply_by_monomial(3, G(0)).is_zero());
    }

    #[test]
    fn test_derivative() {
        // d/dx (x^3 + 5x^2 + 7x + 1) = 3x^2 + 10x + 7 = x^2 + 7 in characteristic 2
        let p = poly(&[1, 5, 7, 1]);
        assert_eq!(p.derivative(), poly(&[1, 0, 7]));
    }

    #[test]
    #[should_panic]
    fn test_divide_by_zero() {
        poly(&[1, 2]).divide(&Polynomial::zero());
    }
}
