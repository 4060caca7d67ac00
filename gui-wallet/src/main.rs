use eframe::{egui, NativeOptions};

fn main() -> eframe::Result<()> {
    let app = WalletApp::default();
    eframe::run_native("Obscura Wallet", NativeOptions::default(), Box::new(|_cc| Box::new(app)))
}

#[derive(Default)]
struct WalletApp {
    address_hash160_hex: String,
    balance_satoshis: u64,
    recipient_hash160_hex: String,
    amount_satoshis: String,
}

impl eframe::App for WalletApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        egui::CentralPanel::default().show(ctx, |ui| {
            ui.heading("Obscura BSV Wallet (placeholder)");
            ui.label(format!("Address (HASH160): {}", self.address_hash160_hex));
            ui.label(format!("Balance: {} sat", self.balance_satoshis));
            ui.separator();
            ui.heading("Send Transaction");
            ui.label("Recipient (HASH160 hex)");
            ui.text_edit_singleline(&mut self.recipient_hash160_hex);
            ui.label("Amount (satoshis)");
            ui.text_edit_singleline(&mut self.amount_satoshis);
            if ui.button("Send").clicked() {
                // TODO: call obscura-rpc's `build`/`fund`/`sign`/`broadcast` over HTTP.
                println!("Sending {} sat to {}", self.amount_satoshis, self.recipient_hash160_hex);
            }
        });
    }
}
