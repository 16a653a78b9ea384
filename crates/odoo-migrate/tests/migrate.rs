#![cfg(not(target_os = "windows"))]

use odoo_test_utils::{Sandbox, assert_snapshot, dir_manifest};

const SALE_EXT_MANIFEST: &str = r#"# Copyright 2021 Someone
# License AGPL-3.0 or later (https://www.gnu.org/licenses/agpl).
{
    'name': 'Sale Extension',
    'version': '14.0.1.0.3',
    'depends': ['sale'],
    'data': [
        'views/assets.xml',
        'views/views.xml',
        'data/mail.xml',
    ],
    'qweb': ['static/src/xml/*.xml'],
    'installable': True,
}
"#;

const SALE_EXT_ASSETS: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<odoo>
  <template id="assets_backend" inherit_id="web.assets_backend">
    <xpath expr="." position="inside">
      <script type="text/javascript" src="/sale_ext/static/src/js/sale.js"/>
    </xpath>
  </template>
</odoo>
"#;

const SALE_EXT_VIEWS: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<odoo>
  <record id="view_order_form" model="ir.ui.view">
    <field name="name">sale.order.form</field>
    <field name="model">sale.order</field>
  </record>

  <template id="report_saleorder" inherit_id="sale.report_saleorder_document">
    <xpath expr="//span[@t-field='doc.name']" position="after">
      <span t-esc="doc.client_order_ref"/>
    </xpath>
  </template>
</odoo>
"#;

const SALE_EXT_MAIL: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<odoo>
  <record id="mail_template_sale" model="mail.template">
    <field name="subject">${object.company_id.name} Order (Ref ${object.name or 'n/a'})</field>
    <field name="body_html" type="html"><div t-raw="object.note"/></field>
  </record>
</odoo>
"#;

fn sale_ext(sb: &mut Sandbox) {
    sb.write("sale_ext/__manifest__.py", SALE_EXT_MANIFEST)
        .write("sale_ext/views/assets.xml", SALE_EXT_ASSETS)
        .write("sale_ext/views/views.xml", SALE_EXT_VIEWS)
        .write("sale_ext/data/mail.xml", SALE_EXT_MAIL);
}

const MIGRATE_14_TO_15: [&str; 6] = [
    "--directory",
    ".",
    "--init-version-name",
    "14.0",
    "--target-version-name",
    "15.0",
];

#[test]
fn test_migrate_module_14_to_15() {
    let mut sb = Sandbox::new();
    sale_ext(&mut sb);

    assert_snapshot!(sb.snapshot_run("odoo-migrate", MIGRATE_14_TO_15), @r"
    Exit Code: 0

    --- STDOUT ---

    --- STDERR ---
    Migrating 1 module(s) from 14.0 to 15.0
    ✓ sale_ext
    ");

    assert_snapshot!(dir_manifest(sb.root_path()), @r#"
    === sale_ext/__manifest__.py
    # Copyright 2021 Someone
    # License AGPL-3.0 or later (https://www.gnu.org/licenses/agpl).
    {
        'name': 'Sale Extension',
        'version': '15.0.1.0.0',
        'depends': ['sale'],
        'data': [
            'views/views.xml',
            'data/mail.xml'
        ],
        'installable': True,
        'assets': {
            'web.assets_backend': [
                '/sale_ext/static/src/js/sale.js'
            ],
            'web.assets_qweb': [
                '/sale_ext/static/src/xml/*.xml'
            ]
        },
    }
    === sale_ext/data/mail.xml
    <?xml version="1.0" encoding="utf-8"?>
    <odoo>
      <record id="mail_template_sale" model="mail.template">
        <field name="subject">{{ object.company_id.name }} Order (Ref {{ object.name or 'n/a' }})</field>
        <field name="body_html" type="html"><div t-out="object.note"/></field>
      </record>
    </odoo>
    === sale_ext/views/views.xml
    <?xml version="1.0" encoding="utf-8"?>
    <odoo>
      <record id="view_order_form" model="ir.ui.view">
        <field name="name">sale.order.form</field>
        <field name="model">sale.order</field>
      </record>

      <template id="report_saleorder" inherit_id="sale.report_saleorder_document">
        <xpath expr="//span[@t-field='doc.name']" position="after">
          <span t-out="doc.client_order_ref"/>
        </xpath>
      </template>
    </odoo>
    "#);
}

#[test]
fn test_second_run_changes_nothing() {
    let mut sb = Sandbox::new();
    sale_ext(&mut sb);

    sb.run("odoo-migrate", MIGRATE_14_TO_15).expect("first run");
    let migrated = dir_manifest(sb.root_path());

    let output = sb.snapshot_run("odoo-migrate", MIGRATE_14_TO_15);
    assert!(output.starts_with("Exit Code: 0"), "{output}");
    assert!(output.contains("sale_ext (unchanged)"), "{output}");
    assert_eq!(dir_manifest(sb.root_path()), migrated);
}

#[test]
fn test_failing_module_does_not_stop_others() {
    let mut sb = Sandbox::new();
    sb.write("broken/__manifest__.py", "manifest = {'name': 'Broken'}\n")
        .write(
            "good/__manifest__.py",
            "{\n    'name': 'Good',\n    'version': '14.0.1.0.0',\n}\n",
        );

    let output = sb.snapshot_run("odoo-migrate", MIGRATE_14_TO_15);
    assert!(output.starts_with("Exit Code: 1"), "{output}");
    assert!(
        output.contains("✗ broken: reformat-assets-definition failed"),
        "{output}"
    );
    assert!(
        output.contains(
            "Failed to read manifest <ROOT>/broken/__manifest__.py: \
             manifest is not a single literal mapping"
        ),
        "{output}"
    );
    assert!(output.contains("✓ good"), "{output}");
    assert!(output.contains("Error: Migration failed with errors"), "{output}");

    assert_eq!(
        sb.read("good/__manifest__.py"),
        "{\n    'name': 'Good',\n    'version': '15.0.1.0.0',\n}\n"
    );
    assert_eq!(sb.read("broken/__manifest__.py"), "manifest = {'name': 'Broken'}\n");
}

#[test]
fn test_modules_filter() {
    let mut sb = Sandbox::new();
    sb.write("broken/__manifest__.py", "manifest = {}\n").write(
        "good/__manifest__.py",
        "{\n    'name': 'Good',\n    'version': '14.0.1.0.0',\n}\n",
    );

    let mut args = MIGRATE_14_TO_15.to_vec();
    args.extend(["--modules", "good"]);
    let output = sb.snapshot_run("odoo-migrate", args);
    assert!(output.starts_with("Exit Code: 0"), "{output}");
    assert!(!output.contains("broken"), "{output}");

    let output = sb.snapshot_run("odoo-migrate", ["-i", "14.0", "-m", "missing"]);
    assert!(output.contains("Module `missing` not found"), "{output}");
}

#[test]
fn test_extra_asset_bundles_from_config() {
    let mut sb = Sandbox::new();
    sb.write(
        "theme_x/__manifest__.py",
        r#"{
    'name': 'Theme',
    'version': '14.0.1.0.0',
    'data': ['views/assets.xml'],
}
"#,
    )
    .write(
        "theme_x/views/assets.xml",
        r#"<odoo>
  <template id="a" inherit_id="theme_common.assets">
    <xpath expr="." position="inside">
      <link rel="stylesheet" href="/theme_x/static/src/scss/theme.scss"/>
    </xpath>
  </template>
</odoo>
"#,
    )
    .write("migrate.toml", "extra_asset_bundles = [\"theme_common.assets\"]\n");

    let mut args = MIGRATE_14_TO_15.to_vec();
    args.extend(["--config", "migrate.toml"]);
    sb.run("odoo-migrate", args).expect("migration succeeds");

    assert!(!sb.exists("theme_x/views/assets.xml"));
    assert_snapshot!(sb.read("theme_x/__manifest__.py"), @r"
    {
        'name': 'Theme',
        'version': '15.0.1.0.0',
        'data': [],
        'assets': {
            'theme_common.assets': [
                '/theme_x/static/src/scss/theme.scss'
            ]
        },
    }
    ");
}

#[test]
fn test_unknown_version() {
    let sb = Sandbox::new();
    let output = sb.snapshot_run("odoo-migrate", ["-i", "14.0", "-t", "16.0"]);
    assert_snapshot!(output, @r"
    Exit Code: 1

    --- STDOUT ---

    --- STDERR ---
    Error: Unknown version `16.0` (available: 14.0, 15.0)
    ");
}
