use bfv::WriterTo;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use seclink::{Context, EncryptedMatrix, Error, KeyBlob, KeyGenConfig, KeySet, Left, Matrix, Product, Right};

const N: usize = 4096;
const T: u64 = 40961;

#[test]
fn context_u64() {
    let context: Context = Context::new(N, T, Some([3, 5])).unwrap();
    let keys: KeySet = context.generate_keys().unwrap();
    sub_test("test_ones_by_threes", || test_ones_by_threes(&context, &keys));
    sub_test("test_round_trips", || test_round_trips(&context, &keys));
    sub_test("test_relinearized", || test_relinearized(&context, &keys));
    sub_test("test_shape_errors", || test_shape_errors(&context, &keys));
    sub_test("test_wrong_keys", || test_wrong_keys(&context, &keys));
    sub_test("test_serialization", || test_serialization(&context, &keys));
    sub_test("test_large_binary", || test_large_binary(&context, &keys));
}

#[test]
fn context_determinism() {
    sub_test("test_seeded_keys", test_seeded_keys);
    sub_test("test_unseeded_keys", test_unseeded_keys);
    sub_test("test_invalid_parameters", test_invalid_parameters);
}

fn sub_test<F: FnOnce()>(name: &str, f: F) {
    println!("Running {}", name);
    f();
}

fn random_binary(rng: &mut StdRng, rows: usize, cols: usize) -> Matrix {
    Matrix::from_fn(rows, cols, |_, _| rng.random_range(0..2)).unwrap()
}

fn test_ones_by_threes(context: &Context, keys: &KeySet) {
    let a: Matrix = Matrix::filled(8, 4, 1).unwrap();
    let b: Matrix = Matrix::from_column_major(4, 8, &[3; 32]).unwrap();
    let left: EncryptedMatrix<Left> = context.encrypt_left(&a, keys.public_key.as_bytes()).unwrap();
    let right: EncryptedMatrix<Right> = context.encrypt_right(&b, keys.public_key.as_bytes()).unwrap();
    let product: EncryptedMatrix<Product> = context
        .multiply(&left, &right, keys.galois_keys.as_bytes())
        .unwrap();
    assert_eq!(product.shape(), (8, 8));
    assert_eq!(product.len(), 4);
    assert!(context.noise_budget(&product, keys.secret_key.as_bytes()).unwrap() > 0);
    assert_eq!(
        context.decrypt(&product, keys.secret_key.as_bytes()).unwrap(),
        Matrix::filled(8, 8, 12).unwrap()
    );
}

fn test_round_trips(context: &Context, keys: &KeySet) {
    let mut rng: StdRng = StdRng::seed_from_u64(1);
    let t: i64 = T as i64;
    let a: Matrix = Matrix::from_fn(37, 21, |_, _| rng.random_range(-(t / 2)..=t / 2)).unwrap();
    let b: Matrix = Matrix::from_fn(21, 9, |_, _| rng.random_range(-(t / 2)..=t / 2)).unwrap();

    let left: EncryptedMatrix<Left> = context.encrypt_left(&a, keys.public_key.as_bytes()).unwrap();
    assert_eq!(left.shape(), (37, 21));
    assert_eq!(left.len(), 32);
    assert_eq!(context.decrypt(&left, keys.secret_key.as_bytes()).unwrap(), a);

    let right: EncryptedMatrix<Right> = context.encrypt_right(&b, keys.public_key.as_bytes()).unwrap();
    assert_eq!(right.shape(), (21, 9));
    assert_eq!(right.len(), 5);
    assert_eq!(context.decrypt(&right, keys.secret_key.as_bytes()).unwrap(), b);
}

fn test_relinearized(context: &Context, keys: &KeySet) {
    let mut rng: StdRng = StdRng::seed_from_u64(2);
    let a: Matrix = Matrix::from_fn(16, 5, |_, _| rng.random_range(-9..10)).unwrap();
    let b: Matrix = Matrix::from_fn(5, 3, |_, _| rng.random_range(-9..10)).unwrap();
    let left: EncryptedMatrix<Left> = context.encrypt_left(&a, keys.public_key.as_bytes()).unwrap();
    let right: EncryptedMatrix<Right> = context.encrypt_right(&b, keys.public_key.as_bytes()).unwrap();

    let product: EncryptedMatrix<Product> = context
        .multiply_relinearized(&left, &right, keys.galois_keys.as_bytes(), keys.relin_keys.as_bytes())
        .unwrap();
    assert!(product.ciphertexts().iter().all(|ct| ct.degree() == 1));
    let expected: Matrix = a.matmul(&b).unwrap();
    assert_eq!(context.decrypt(&product, keys.secret_key.as_bytes()).unwrap(), expected);

    let later: EncryptedMatrix<Product> = context
        .relinearize(
            &context.multiply(&left, &right, keys.galois_keys.as_bytes()).unwrap(),
            keys.relin_keys.as_bytes(),
        )
        .unwrap();
    assert!(later.ciphertexts().iter().all(|ct| ct.degree() == 1));
    assert_eq!(context.decrypt(&later, keys.secret_key.as_bytes()).unwrap(), expected);
}

fn test_shape_errors(context: &Context, keys: &KeySet) {
    let pk: &[u8] = keys.public_key.as_bytes();
    let left: EncryptedMatrix<Left> = context.encrypt_left(&Matrix::filled(4, 3, 1).unwrap(), pk).unwrap();
    let right: EncryptedMatrix<Right> = context.encrypt_right(&Matrix::filled(4, 2, 1).unwrap(), pk).unwrap();
    assert!(matches!(
        context.multiply(&left, &right, keys.galois_keys.as_bytes()),
        Err(Error::ShapeMismatch {
            left: (4, 3),
            right: (4, 2)
        })
    ));

    assert!(matches!(
        context.encrypt_left(&Matrix::filled(2049, 2, 1).unwrap(), pk),
        Err(Error::DimensionOverflow(_))
    ));
    assert!(matches!(
        context.encrypt_left(&Matrix::filled(2, 2049, 1).unwrap(), pk),
        Err(Error::DimensionOverflow(_))
    ));
    assert!(matches!(
        context.encrypt_right(&Matrix::filled(2049, 2, 1).unwrap(), pk),
        Err(Error::DimensionOverflow(_))
    ));
    assert!(matches!(Matrix::filled(0, 2, 1), Err(Error::InvalidParameter(_))));
}

fn test_wrong_keys(context: &Context, keys: &KeySet) {
    let other: Context = Context::new(N, 65537, Some([3, 5])).unwrap();
    let other_keys: KeySet = other.generate_keys().unwrap();
    let a: Matrix = Matrix::filled(4, 4, 2).unwrap();

    assert!(matches!(
        context.encrypt_left(&a, other_keys.public_key.as_bytes()),
        Err(Error::ContextMismatch { .. })
    ));

    let left: EncryptedMatrix<Left> = context.encrypt_left(&a, keys.public_key.as_bytes()).unwrap();
    let right: EncryptedMatrix<Right> = other.encrypt_right(&a, other_keys.public_key.as_bytes()).unwrap();
    assert!(matches!(
        context.multiply(&left, &right, keys.galois_keys.as_bytes()),
        Err(Error::ContextMismatch { .. })
    ));
    assert!(matches!(
        context.decrypt(&left, other_keys.secret_key.as_bytes()),
        Err(Error::ContextMismatch { .. })
    ));
    assert!(matches!(
        context.decrypt(&left, &keys.secret_key.as_bytes()[..10]),
        Err(Error::Serialization(_))
    ));
}

fn test_serialization(context: &Context, keys: &KeySet) {
    let a: Matrix = Matrix::from_fn(6, 3, |i, j| (i * 3 + j) as i64).unwrap();
    let left: EncryptedMatrix<Left> = context.encrypt_left(&a, keys.public_key.as_bytes()).unwrap();
    let mut bytes: Vec<u8> = Vec::new();
    left.write_to(&mut bytes).unwrap();

    let read: EncryptedMatrix<Left> = context.read_encrypted(&mut bytes.as_slice()).unwrap();
    assert_eq!(read, left);
    assert_eq!(context.decrypt(&read, keys.secret_key.as_bytes()).unwrap(), a);

    assert!(matches!(
        context.read_encrypted::<Right, _>(&mut bytes.as_slice()),
        Err(Error::Serialization(_))
    ));
    assert!(matches!(
        context.read_encrypted::<Left, _>(&mut &bytes[..bytes.len() - 1]),
        Err(Error::Serialization(_))
    ));
}

fn test_large_binary(context: &Context, keys: &KeySet) {
    let mut rng: StdRng = StdRng::seed_from_u64(7);
    let a: Matrix = random_binary(&mut rng, 2048, 512);
    let b: Matrix = random_binary(&mut rng, 512, 2);
    let left: EncryptedMatrix<Left> = context.encrypt_left(&a, keys.public_key.as_bytes()).unwrap();
    let right: EncryptedMatrix<Right> = context.encrypt_right(&b, keys.public_key.as_bytes()).unwrap();
    assert_eq!(left.len(), 512);
    assert_eq!(right.len(), 1);

    let product: EncryptedMatrix<Product> = context
        .multiply(&left, &right, keys.galois_keys.as_bytes())
        .unwrap();
    assert_eq!(product.shape(), (2048, 2));
    let budget: u32 = context.noise_budget(&product, keys.secret_key.as_bytes()).unwrap();
    println!("noise budget after a 512-term product: {} bits", budget);
    assert!(budget > 0);
    assert_eq!(
        context.decrypt(&product, keys.secret_key.as_bytes()).unwrap(),
        a.matmul(&b).unwrap()
    );
}

fn test_seeded_keys() {
    let config: KeyGenConfig = KeyGenConfig {
        galois_key_bits: 20,
        relin_key_bits: 40,
    };
    let first: Context = Context::new(N, T, Some([11, 13])).unwrap();
    let second: Context = Context::new(N, T, Some([11, 13])).unwrap();
    let (k0, k1) = (
        first.generate_keys_with(config).unwrap(),
        second.generate_keys_with(config).unwrap(),
    );
    assert_eq!(k0.secret_key, k1.secret_key);
    assert_eq!(k0.public_key, k1.public_key);
    assert_eq!(k0.galois_keys, k1.galois_keys);
    assert_eq!(k0.relin_keys, k1.relin_keys);

    let a: Matrix = Matrix::filled(3, 2, 5).unwrap();
    let x: EncryptedMatrix<Left> = first.encrypt_left(&a, k0.public_key.as_bytes()).unwrap();
    let y: EncryptedMatrix<Left> = second.encrypt_left(&a, k1.public_key.as_bytes()).unwrap();
    assert_eq!(x, y);
    assert_eq!(second.decrypt(&x, k1.secret_key.as_bytes()).unwrap(), a);
}

fn test_unseeded_keys() {
    let first: Context = Context::new(N, T, None).unwrap();
    let second: Context = Context::new(N, T, None).unwrap();
    assert_eq!(first.parms_id(), second.parms_id());
    let k0: KeySet = first.generate_keys().unwrap();
    let k1: KeySet = second.generate_keys().unwrap();
    assert_ne!(k0.secret_key, k1.secret_key);
    assert_ne!(k0.public_key, k1.public_key);
    let blob: KeyBlob = KeyBlob::from_bytes(k0.public_key.as_bytes().to_vec());
    assert_eq!(blob, k0.public_key);
    k0.release();
    k1.release();
}

fn test_invalid_parameters() {
    assert!(matches!(Context::new(1000, 12289, None), Err(Error::InvalidParameter(_))));
    assert!(matches!(Context::new(1024, 12289, None), Err(Error::InvalidParameter(_))));
    assert!(matches!(Context::new(2048, 12289, None), Err(Error::InvalidParameter(_))));
    assert!(matches!(Context::new(4096, 40962, None), Err(Error::InvalidParameter(_))));
    // 12289 = 3 * 2^12 + 1 is not 1 mod 2 * 4096
    assert!(matches!(Context::new(4096, 12289, None), Err(Error::InvalidParameter(_))));
    let context: Context = Context::new(N, T, None).unwrap();
    assert!(matches!(
        context.generate_keys_with(KeyGenConfig {
            galois_key_bits: 0,
            relin_key_bits: 30
        }),
        Err(Error::InvalidParameter(_))
    ));
}
