use crate::common::galois::{Polynomial, G};

// Reed-Solomon encoder
//------------------------------------------------------------------------------

// Keeps every generator polynomial built so far, indexed by degree
#[derive(Debug, Clone)]
pub struct ReedSolomonEncoder {
    cache: Vec<Polynomial>,
}

impl Default for ReedSolomonEncoder {
    fn default() -> Self {
        Self::new()
    }
}

impl ReedSolomonEncoder {
    pub fn new() -> Self {
        Self { cache: vec![Polynomial::one()] }
    }

    // g(x) = (x - α^0)(x - α^1)...(x - α^(degree-1))
    fn generator(&mut self, degree: usize) -> &Polynomial {
        while self.cache.len() <= degree {
            let d = self.cache.len() - 1;
            let factor = Polynomial::new(vec![G::ONE, G::gen_pow(d)]);
            let next = self.cache[d].multiply(&factor);
            self.cache.push(next);
        }
        &self.cache[degree]
    }

    // Returns the `ec_len` error correction codewords of `data`
    pub fn encode(&mut self, data: &[u8], ec_len: usize) -> Vec<u8> {
        debug_assert!(ec_len > 0, "Error correction length must be positive");

        let gen = self.generator(ec_len).clone();
        let info = Polynomial::from_bytes(data).multiply_by_monomial(ec_len, G::ONE);
        let (_, rem) = info.divide(&gen);

        let coeffs = rem.coeffs();
        let mut res = vec![0; ec_len - coeffs.len()];
        res.extend(coeffs.iter().map(|&c| u8::from(c)));
        res
    }
}
