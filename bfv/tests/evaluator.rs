use bfv::{Ciphertext, Context, Error, GaloisKeys, Keys, Plaintext, ReaderFrom, TensorAccumulator, WriterTo};

#[test]
fn evaluator_u64() {
    let context: Context = Context::initialize(4096, 40961, Some([17, 42])).unwrap();
    let keys: Keys = context.generate_keys().unwrap();

    sub_test("test_encrypt_decrypt", || test_encrypt_decrypt(&context, &keys));
    sub_test("test_add_sub_negate", || test_add_sub_negate(&context, &keys));
    sub_test("test_multiply_relinearize", || test_multiply_relinearize(&context, &keys));
    sub_test("test_multiply_accumulate", || test_multiply_accumulate(&context, &keys));
    sub_test("test_depth_exceeded", || test_depth_exceeded(&context, &keys));
    sub_test("test_rotate_rows", || test_rotate_rows(&context, &keys));
    sub_test("test_rotate_columns", || test_rotate_columns(&context, &keys));
    sub_test("test_unsupported_rotation", || test_unsupported_rotation(&context, &keys));
    sub_test("test_context_mismatch", || test_context_mismatch(&context, &keys));
    sub_test("test_keys_serialization", || test_keys_serialization(&context, &keys));
}

fn sub_test<F: FnOnce()>(name: &str, f: F) {
    println!("Running {}", name);
    f();
}

fn values(n: usize, seed: i64) -> Vec<i64> {
    (0..n as i64).map(|i| (i * 37 + seed * 101) % 200 - 100).collect()
}

fn encrypt(context: &Context, keys: &Keys, v: &[i64]) -> Ciphertext {
    let pt: Plaintext = context.encode(v).unwrap();
    context.encrypt(&pt, &keys.public_key).unwrap()
}

fn decrypt(context: &Context, keys: &Keys, ct: &Ciphertext) -> Vec<i64> {
    let pt: Plaintext = context.decrypt(ct, &keys.secret_key).unwrap();
    context.decode(&pt).unwrap()
}

fn test_encrypt_decrypt(context: &Context, keys: &Keys) {
    let v: Vec<i64> = values(context.slots(), 1);
    let ct: Ciphertext = encrypt(context, keys, &v);
    assert_eq!(ct.degree(), 1);
    assert_eq!(ct.depth(), 0);
    assert_eq!(decrypt(context, keys, &ct), v);
    assert!(context.noise_budget(&ct, &keys.secret_key).unwrap() > 60);
}

fn test_add_sub_negate(context: &Context, keys: &Keys) {
    let a: Vec<i64> = values(context.slots(), 2);
    let b: Vec<i64> = values(context.slots(), 3);
    let ca: Ciphertext = encrypt(context, keys, &a);
    let cb: Ciphertext = encrypt(context, keys, &b);

    let sum: Vec<i64> = decrypt(context, keys, &context.add(&ca, &cb).unwrap());
    let diff: Vec<i64> = decrypt(context, keys, &context.sub(&ca, &cb).unwrap());
    let neg: Vec<i64> = decrypt(context, keys, &context.negate(&ca).unwrap());
    for i in 0..a.len() {
        assert_eq!(sum[i], a[i] + b[i]);
        assert_eq!(diff[i], a[i] - b[i]);
        assert_eq!(neg[i], -a[i]);
    }
}

fn test_multiply_relinearize(context: &Context, keys: &Keys) {
    let a: Vec<i64> = values(context.slots(), 4);
    let b: Vec<i64> = values(context.slots(), 5);
    let ca: Ciphertext = encrypt(context, keys, &a);
    let cb: Ciphertext = encrypt(context, keys, &b);

    let prod: Ciphertext = context.multiply(&ca, &cb).unwrap();
    assert_eq!(prod.degree(), 2);
    assert_eq!(prod.depth(), 1);
    let expected: Vec<i64> = a.iter().zip(b.iter()).map(|(x, y)| x * y).collect();
    assert_eq!(decrypt(context, keys, &prod), expected);

    let relin: Ciphertext = context.relinearize(&prod, &keys.relin_keys).unwrap();
    assert_eq!(relin.degree(), 1);
    assert_eq!(decrypt(context, keys, &relin), expected);
    assert!(context.noise_budget(&relin, &keys.secret_key).unwrap() > 0);
}

fn test_multiply_accumulate(context: &Context, keys: &Keys) {
    let n: usize = context.slots();
    let mut acc: TensorAccumulator = context.accumulator();
    let mut expected: Vec<i64> = vec![0; n];
    for k in 0..8 {
        // |sum| stays below t/2
        let a: Vec<i64> = values(n, 10 + k).iter().map(|x| x / 10).collect();
        let b: Vec<i64> = values(n, 20 + k).iter().map(|x| x / 10).collect();
        let ca: Ciphertext = encrypt(context, keys, &a);
        let cb: Ciphertext = encrypt(context, keys, &b);
        context.multiply_accumulate(&mut acc, &ca, &cb).unwrap();
        expected.iter_mut().zip(a.iter().zip(b.iter())).for_each(|(e, (x, y))| *e += x * y);
    }
    assert_eq!(acc.terms(), 8);
    let sum: Ciphertext = context.rescale(&acc).unwrap();
    assert_eq!(decrypt(context, keys, &sum), expected);

    assert!(matches!(context.rescale(&context.accumulator()), Err(Error::InvalidCiphertext(_))));
}

fn test_depth_exceeded(context: &Context, keys: &Keys) {
    let ct: Ciphertext = encrypt(context, keys, &values(16, 6));
    let prod: Ciphertext = context.multiply(&ct, &ct).unwrap();
    let relin: Ciphertext = context.relinearize(&prod, &keys.relin_keys).unwrap();
    assert!(matches!(
        context.multiply(&relin, &ct),
        Err(Error::DepthExceeded { depth: 2, max: 1 })
    ));
}

fn test_rotate_rows(context: &Context, keys: &Keys) {
    let row: usize = context.row_size();
    let v: Vec<i64> = values(context.slots(), 7);
    let ct: Ciphertext = encrypt(context, keys, &v);

    for steps in [1i64, 2, 5, 511, -1, -3, row as i64 - 1] {
        let rotated: Vec<i64> = decrypt(context, keys, &context.rotate_rows(&ct, steps, &keys.galois_keys).unwrap());
        let r: usize = steps.rem_euclid(row as i64) as usize;
        for j in 0..row {
            assert_eq!(rotated[j], v[(j + r) % row], "steps={}", steps);
            assert_eq!(rotated[row + j], v[row + (j + r) % row], "steps={}", steps);
        }
    }
    assert_eq!(context.rotate_rows(&ct, 0, &keys.galois_keys).unwrap(), ct);
}

fn test_rotate_columns(context: &Context, keys: &Keys) {
    let row: usize = context.row_size();
    let v: Vec<i64> = values(context.slots(), 8);
    let ct: Ciphertext = encrypt(context, keys, &v);
    let swapped: Vec<i64> = decrypt(context, keys, &context.rotate_columns(&ct, &keys.galois_keys).unwrap());
    for j in 0..row {
        assert_eq!(swapped[j], v[row + j]);
        assert_eq!(swapped[row + j], v[j]);
    }
}

fn test_unsupported_rotation(context: &Context, keys: &Keys) {
    let row: i64 = context.row_size() as i64;
    let ct: Ciphertext = encrypt(context, keys, &values(8, 9));
    assert!(matches!(
        context.rotate_rows(&ct, row, &keys.galois_keys),
        Err(Error::UnsupportedRotation { .. })
    ));
    assert!(matches!(
        context.rotate_rows(&ct, -row, &keys.galois_keys),
        Err(Error::UnsupportedRotation { .. })
    ));

    // only the rotation by one step
    let gal_el: usize = context.galois_element_for_step(1);
    let partial: GaloisKeys = context
        .key_generator()
        .gen_galois_keys(&keys.secret_key, &[gal_el], 30)
        .unwrap();
    assert!(context.rotate_rows(&ct, 1, &partial).is_ok());
    assert!(matches!(
        context.rotate_rows(&ct, 2, &partial),
        Err(Error::UnsupportedRotation { steps: 2 })
    ));
    assert!(matches!(
        context.rotate_columns(&ct, &partial),
        Err(Error::UnsupportedRotation { steps: 0 })
    ));
}

fn test_context_mismatch(context: &Context, keys: &Keys) {
    let other: Context = Context::initialize(4096, 65537, None).unwrap();
    let ct: Ciphertext = encrypt(context, keys, &values(8, 10));
    assert!(matches!(other.decrypt(&ct, &keys.secret_key), Err(Error::ContextMismatch { .. })));
    assert!(matches!(other.multiply(&ct, &ct), Err(Error::ContextMismatch { .. })));
    let pt: Plaintext = other.encode(&[1, 2, 3]).unwrap();
    assert!(matches!(context.encrypt(&pt, &keys.public_key), Err(Error::ContextMismatch { .. })));
}

fn test_keys_serialization(context: &Context, keys: &Keys) {
    let mut bytes: Vec<u8> = Vec::new();
    keys.galois_keys.write_to(&mut bytes).unwrap();
    let mut galois_keys: GaloisKeys = GaloisKeys::default();
    galois_keys.read_from(&mut bytes.as_slice()).unwrap();
    context.validate_galois_keys(&galois_keys).unwrap();
    assert_eq!(galois_keys, keys.galois_keys);

    let ct: Ciphertext = encrypt(context, keys, &values(32, 11));
    bytes.clear();
    ct.write_to(&mut bytes).unwrap();
    let mut decoded: Ciphertext = Ciphertext::default();
    decoded.read_from(&mut bytes.as_slice()).unwrap();
    context.validate_ciphertext(&decoded).unwrap();
    assert_eq!(decrypt(context, keys, &decoded), decrypt(context, keys, &ct));
}
