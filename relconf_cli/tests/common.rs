use assert_cmd::Command;
use insta_cmd::get_cargo_bin;

pub fn relconf_cmd() -> Command {
	let mut cmd = Command::new(get_cargo_bin("relconf"));
	cmd.env("NO_COLOR", "1");
	cmd.env_remove("RELCONF_LOG");
	cmd
}
