use ks_cipher::{
    Aes128, BlockTransform, LaneWidth, Magma, Speck128Full, Threefry4x64R20, Threefry4x64R72, Word,
    WordBlock, Xtea, Xtea2,
};
use serde::{Deserialize, de};

const VECTORS_JSON: &[u8] = include_bytes!("data/vectors.json");

fn de_hex_vec<'de, D>(deserializer: D) -> Result<Vec<u8>, D::Error>
where
    D: serde::Deserializer<'de>, {
    let encoded = <&str>::deserialize(deserializer)?;
    hex::decode(encoded).map_err(de::Error::custom)
}

#[derive(Deserialize)]
struct VectorFile {
    vectors: Vec<Vector>,
}

#[derive(Deserialize)]
struct Vector {
    algorithm: Algorithm,
    label: String,
    #[serde(deserialize_with = "de_hex_vec")]
    key: Vec<u8>,
    #[serde(deserialize_with = "de_hex_vec")]
    plaintext: Vec<u8>,
    #[serde(deserialize_with = "de_hex_vec")]
    ciphertext: Vec<u8>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
enum Algorithm {
    #[serde(rename = "AES-128")]
    Aes128,
    #[serde(rename = "Speck128/128")]
    Speck128,
    #[serde(rename = "Threefry4x64x20")]
    Threefry20,
    #[serde(rename = "Threefry4x64x72")]
    Threefry72,
    #[serde(rename = "Magma")]
    Magma,
    #[serde(rename = "XTEA")]
    Xtea,
    #[serde(rename = "XTEA2")]
    Xtea2,
}

fn load() -> Vec<Vector> {
    serde_json::from_slice::<VectorFile>(VECTORS_JSON)
        .expect("json")
        .vectors
}

fn block_from_le<B: WordBlock>(bytes: &[u8]) -> B {
    let width = (<B::Word as Word>::BITS / 8) as usize;
    assert_eq!(bytes.len(), width * B::LEN, "block length");
    let mut block = B::zeroed();
    for (w, chunk) in block.as_mut().iter_mut().zip(bytes.chunks_exact(width)) {
        *w = <B::Word as Word>::from_le_slice(chunk);
    }
    block
}

fn check<T: BlockTransform>(v: &Vector) {
    let t = T::new_from_slice(&v.key).expect("key length");
    let input: T::Block = block_from_le(&v.plaintext);
    let expected: T::Block = block_from_le(&v.ciphertext);
    assert_eq!(t.encrypt(&input), expected, "{}: {}", T::NAME, v.label);

    // The vector in every slot of an odd-sized batch exercises both the
    // kernel and the tail for each width.
    for width in LaneWidth::ALL {
        let mut blocks = vec![input; 2 * width.get() + 1];
        t.encrypt_batch(&mut blocks, width);
        assert!(
            blocks.iter().all(|b| *b == expected),
            "{} batched x{width}: {}",
            T::NAME,
            v.label
        );
    }
}

#[test]
fn published_vectors() {
    let vectors = load();
    assert!(!vectors.is_empty());
    for v in &vectors {
        match v.algorithm {
            Algorithm::Aes128 => check::<Aes128>(v),
            Algorithm::Speck128 => check::<Speck128Full>(v),
            Algorithm::Threefry20 => check::<Threefry4x64R20>(v),
            Algorithm::Threefry72 => check::<Threefry4x64R72>(v),
            Algorithm::Magma => check::<Magma>(v),
            Algorithm::Xtea => check::<Xtea>(v),
            Algorithm::Xtea2 => check::<Xtea2>(v),
        }
    }
}

#[test]
fn every_algorithm_has_a_vector() {
    let vectors = load();
    for algorithm in [
        Algorithm::Aes128,
        Algorithm::Speck128,
        Algorithm::Threefry20,
        Algorithm::Threefry72,
        Algorithm::Magma,
        Algorithm::Xtea,
        Algorithm::Xtea2,
    ] {
        assert!(
            vectors.iter().any(|v| v.algorithm == algorithm),
            "no vector for {algorithm:?}"
        );
    }
}

#[test]
fn wrong_key_length_is_rejected() {
    let err = Aes128::new_from_slice(&[0u8; 15]).err().expect("short key");
    assert_eq!((err.expected, err.actual), (16, 15));
    assert!(Magma::new_from_slice(&[0u8; 33]).is_err());
    assert!(Threefry4x64R20::new_from_slice(&[0u8; 24]).is_err());
}
