use std::env;

fn main() {
    // Read network configuration from environment variables (optional).
    // These become the default values for the runtime config structs.

    // WiFi SSID (network name)
    if let Ok(ssid) = env::var("WIFI_SSID") {
        println!("cargo:rustc-env=WIFI_SSID={}", ssid);
        println!("cargo:warning=Using WIFI_SSID from environment: {}", ssid);
    } else {
        println!("cargo:rustc-env=WIFI_SSID=");
    }

    // WiFi password
    if let Ok(password) = env::var("WIFI_PASSWORD") {
        println!("cargo:rustc-env=WIFI_PASSWORD={}", password);
        println!("cargo:warning=Using WIFI_PASSWORD from environment (hidden)");
    } else {
        println!("cargo:rustc-env=WIFI_PASSWORD=");
    }

    // Syslog collector hostname (or literal IP address)
    if let Ok(host) = env::var("SYSLOG_HOST") {
        println!("cargo:rustc-env=SYSLOG_HOST={}", host);
        println!("cargo:warning=Using SYSLOG_HOST from environment: {}", host);
    } else {
        println!("cargo:rustc-env=SYSLOG_HOST=");
    }

    // Syslog collector UDP port (default: 514)
    if let Ok(port) = env::var("SYSLOG_PORT") {
        println!("cargo:rustc-env=SYSLOG_PORT={}", port);
        println!("cargo:warning=Using SYSLOG_PORT from environment: {}", port);
    } else {
        println!("cargo:rustc-env=SYSLOG_PORT=514");
    }

    // Rerun if environment variables change
    println!("cargo:rerun-if-env-changed=WIFI_SSID");
    println!("cargo:rerun-if-env-changed=WIFI_PASSWORD");
    println!("cargo:rerun-if-env-changed=SYSLOG_HOST");
    println!("cargo:rerun-if-env-changed=SYSLOG_PORT");
}
