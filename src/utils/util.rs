const NAME_ALPHABET: [char; 36] = [
    'a', 'b', 'c', 'd', 'e', 'f', 'g', 'h', 'i', 'j', 'k', 'l', 'm', 'n', 'o', 'p', 'q', 'r', 's',
    't', 'u', 'v', 'w', 'x', 'y', 'z', '0', '1', '2', '3', '4', '5', '6', '7', '8', '9',
];

/// Random lowercase alphanumeric name, used for wallets and smoke-test users.
pub fn random_name(len: usize) -> String {
    nanoid::nanoid!(len, &NAME_ALPHABET)
}

/// Returns `uris` sorted lexicographically.
pub fn sorted(mut uris: Vec<String>) -> Vec<String> {
    uris.sort();
    uris
}
