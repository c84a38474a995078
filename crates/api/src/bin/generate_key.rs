use classify::auth::{API_KEY_HEADER, generate_api_key};

fn main() {
    let key = generate_api_key();

    println!("{key}");
    eprintln!("Set API_KEY={key} on the server and send it in the {API_KEY_HEADER} header.");
}
