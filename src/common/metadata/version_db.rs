use super::ECBlocks;

const fn ecb(ec: usize, count1: usize, data1: usize, count2: usize, data2: usize) -> ECBlocks {
    ECBlocks::new(ec, count1, data1, count2, data2)
}

// EC blocks per version for levels L, M, Q, H
//   ecb(ec codewords per block, group 1 block count, group 1 data codewords,
//       group 2 block count, group 2 data codewords)
#[rustfmt::skip]
pub(crate) static EC_BLOCKS: [[ECBlocks; 4]; 40] = [
    [ecb(7, 1, 19, 0, 0), ecb(10, 1, 16, 0, 0), ecb(13, 1, 13, 0, 0), ecb(17, 1, 9, 0, 0)], // 1
    [ecb(10, 1, 34, 0, 0), ecb(16, 1, 28, 0, 0), ecb(22, 1, 22, 0, 0), ecb(28, 1, 16, 0, 0)], // 2
    [ecb(15, 1, 55, 0, 0), ecb(26, 1, 44, 0, 0), ecb(18, 2, 17, 0, 0), ecb(22, 2, 13, 0, 0)], // 3
    [ecb(20, 1, 80, 0, 0), ecb(18, 2, 32, 0, 0), ecb(26, 2, 24, 0, 0), ecb(16, 4, 9, 0, 0)], // 4
    [ecb(26, 1, 108, 0, 0), ecb(24, 2, 43, 0, 0), ecb(18, 2, 15, 2, 16), ecb(22, 2, 11, 2, 12)], // 5
    [ecb(18, 2, 68, 0, 0), ecb(16, 4, 27, 0, 0), ecb(24, 4, 19, 0, 0), ecb(28, 4, 15, 0, 0)], // 6
    [ecb(20, 2, 78, 0, 0), ecb(18, 4, 31, 0, 0), ecb(18, 2, 14, 4, 15), ecb(26, 4, 13, 1, 14)], // 7
    [ecb(24, 2, 97, 0, 0), ecb(22, 2, 38, 2, 39), ecb(22, 4, 18, 2, 19), ecb(26, 4, 14, 2, 15)], // 8
    [ecb(30, 2, 116, 0, 0), ecb(22, 3, 36, 2, 37), ecb(20, 4, 16, 4, 17), ecb(24, 4, 12, 4, 13)], // 9
    [ecb(18, 2, 68, 2, 69), ecb(26, 4, 43, 1, 44), ecb(24, 6, 19, 2, 20), ecb(28, 6, 15, 2, 16)], // 10
    [ecb(20, 4, 81, 0, 0), ecb(30, 1, 50, 4, 51), ecb(28, 4, 22, 4, 23), ecb(24, 3, 12, 8, 13)], // 11
    [ecb(24, 2, 92, 2, 93), ecb(22, 6, 36, 2, 37), ecb(26, 4, 20, 6, 21), ecb(28, 7, 14, 4, 15)], // 12
    [ecb(26, 4, 107, 0, 0), ecb(22, 8, 37, 1, 38), ecb(24, 8, 20, 4, 21), ecb(22, 12, 11, 4, 12)], // 13
    [ecb(30, 3, 115, 1, 116), ecb(24, 4, 40, 5, 41), ecb(20, 11, 16, 5, 17), ecb(24, 11, 12, 5, 13)], // 14
    [ecb(22, 5, 87, 1, 88), ecb(24, 5, 41, 5, 42), ecb(30, 5, 24, 7, 25), ecb(24, 11, 12, 7, 13)], // 15
    [ecb(24, 5, 98, 1, 99), ecb(28, 7, 45, 3, 46), ecb(24, 15, 19, 2, 20), ecb(30, 3, 15, 13, 16)], // 16
    [ecb(28, 1, 107, 5, 108), ecb(28, 10, 46, 1, 47), ecb(28, 1, 22, 15, 23), ecb(28, 2, 14, 17, 15)], // 17
    [ecb(30, 5, 120, 1, 121), ecb(26, 9, 43, 4, 44), ecb(28, 17, 22, 1, 23), ecb(28, 2, 14, 19, 15)], // 18
    [ecb(28, 3, 113, 4, 114), ecb(26, 3, 44, 11, 45), ecb(26, 17, 21, 4, 22), ecb(26, 9, 13, 16, 14)], // 19
    [ecb(28, 3, 107, 5, 108), ecb(26, 3, 41, 13, 42), ecb(30, 15, 24, 5, 25), ecb(28, 15, 15, 10, 16)], // 20
    [ecb(28, 4, 116, 4, 117), ecb(26, 17, 42, 0, 0), ecb(28, 17, 22, 6, 23), ecb(30, 19, 16, 6, 17)], // 21
    [ecb(28, 2, 111, 7, 112), ecb(28, 17, 46, 0, 0), ecb(30, 7, 24, 16, 25), ecb(24, 34, 13, 0, 0)], // 22
    [ecb(30, 4, 121, 5, 122), ecb(28, 4, 47, 14, 48), ecb(30, 11, 24, 14, 25), ecb(30, 16, 15, 14, 16)], // 23
    [ecb(30, 6, 117, 4, 118), ecb(28, 6, 45, 14, 46), ecb(30, 11, 24, 16, 25), ecb(30, 30, 16, 2, 17)], // 24
    [ecb(26, 8, 106, 4, 107), ecb(28, 8, 47, 13, 48), ecb(30, 7, 24, 22, 25), ecb(30, 22, 15, 13, 16)], // 25
    [ecb(28, 10, 114, 2, 115), ecb(28, 19, 46, 4, 47), ecb(28, 28, 22, 6, 23), ecb(30, 33, 16, 4, 17)], // 26
    [ecb(30, 8, 122, 4, 123), ecb(28, 22, 45, 3, 46), ecb(30, 8, 23, 26, 24), ecb(30, 12, 15, 28, 16)], // 27
    [ecb(30, 3, 117, 10, 118), ecb(28, 3, 45, 23, 46), ecb(30, 4, 24, 31, 25), ecb(30, 11, 15, 31, 16)], // 28
    [ecb(30, 7, 116, 7, 117), ecb(28, 21, 45, 7, 46), ecb(30, 1, 23, 37, 24), ecb(30, 19, 15, 26, 16)], // 29
    [ecb(30, 5, 115, 10, 116), ecb(28, 19, 47, 10, 48), ecb(30, 15, 24, 25, 25), ecb(30, 23, 15, 25, 16)], // 30
    [ecb(30, 13, 115, 3, 116), ecb(28, 2, 46, 29, 47), ecb(30, 42, 24, 1, 25), ecb(30, 23, 15, 28, 16)], // 31
    [ecb(30, 17, 115, 0, 0), ecb(28, 10, 46, 23, 47), ecb(30, 10, 24, 35, 25), ecb(30, 19, 15, 35, 16)], // 32
    [ecb(30, 17, 115, 1, 116), ecb(28, 14, 46, 21, 47), ecb(30, 29, 24, 19, 25), ecb(30, 11, 15, 46, 16)], // 33
    [ecb(30, 13, 115, 6, 116), ecb(28, 14, 46, 23, 47), ecb(30, 44, 24, 7, 25), ecb(30, 59, 16, 1, 17)], // 34
    [ecb(30, 12, 121, 7, 122), ecb(28, 12, 47, 26, 48), ecb(30, 39, 24, 14, 25), ecb(30, 22, 15, 41, 16)], // 35
    [ecb(30, 6, 121, 14, 122), ecb(28, 6, 47, 34, 48), ecb(30, 46, 24, 10, 25), ecb(30, 2, 15, 64, 16)], // 36
    [ecb(30, 17, 122, 4, 123), ecb(28, 29, 46, 14, 47), ecb(30, 49, 24, 10, 25), ecb(30, 24, 15, 46, 16)], // 37
    [ecb(30, 4, 122, 18, 123), ecb(28, 13, 46, 32, 47), ecb(30, 48, 24, 14, 25), ecb(30, 42, 15, 32, 16)], // 38
    [ecb(30, 20, 117, 4, 118), ecb(28, 40, 47, 7, 48), ecb(30, 43, 24, 22, 25), ecb(30, 10, 15, 67, 16)], // 39
    [ecb(30, 19, 118, 6, 119), ecb(28, 18, 47, 31, 48), ecb(30, 34, 24, 34, 25), ecb(30, 20, 15, 61, 16)], // 40
];

pub(crate) static ALIGNMENT_PATTERN_POSITIONS: [&[i32]; 40] = [
    &[],
    &[6, 18],
    &[6, 22],
    &[6, 26],
    &[6, 30],
    &[6, 34],
    &[6, 22, 38],
    &[6, 24, 42],
    &[6, 26, 46],
    &[6, 28, 50],
    &[6, 30, 54],
    &[6, 32, 58],
    &[6, 34, 62],
    &[6, 26, 46, 66],
    &[6, 26, 48, 70],
    &[6, 26, 50, 74],
    &[6, 30, 54, 78],
    &[6, 30, 56, 82],
    &[6, 30, 58, 86],
    &[6, 34, 62, 90],
    &[6, 28, 50, 72, 94],
    &[6, 26, 50, 74, 98],
    &[6, 30, 54, 78, 102],
    &[6, 28, 54, 80, 106],
    &[6, 32, 58, 84, 110],
    &[6, 30, 58, 86, 114],
    &[6, 34, 62, 90, 118],
    &[6, 26, 50, 74, 98, 122],
    &[6, 30, 54, 78, 102, 126],
    &[6, 26, 52, 78, 104, 130],
    &[6, 30, 56, 82, 108, 134],
    &[6, 34, 60, 86, 112, 138],
    &[6, 30, 58, 86, 114, 142],
    &[6, 34, 62, 90, 118, 146],
    &[6, 30, 54, 78, 102, 126, 150],
    &[6, 24, 50, 76, 102, 128, 154],
    &[6, 28, 54, 80, 106, 132, 158],
    &[6, 32, 58, 84, 110, 136, 162],
    &[6, 26, 54, 82, 110, 138, 166],
    &[6, 30, 58, 86, 114, 142, 170],
];

// Remainder bits after the last codeword per version
pub(crate) static REMAINDER_BITS: [usize; 40] = [
    0, 7, 7, 7, 7, 7, 0, 0, 0, 0,
    0, 0, 0, 3, 3, 3, 3, 3, 3, 3,
    4, 4, 4, 4, 4, 4, 4, 3, 3, 3,
    3, 3, 3, 3, 0, 0, 0, 0, 0, 0,
];
