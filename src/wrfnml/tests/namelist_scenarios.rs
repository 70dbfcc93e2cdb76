// wrfnml/tests/namelist_scenarios.rs

use wrfnml::error::Result;
use wrfnml::{reads, reads_with_env, Env, NamelistError, Scalar, Value, ValueError};

const NAMELIST_WPS: &str = r#"
# WPS template, filled per cycle
&share
 wrf_core = 'ARW',
 max_dom = 2,
 start_date = '2013-06-14_00:00:00','2013-06-14_00:00:00',
 end_date   = '2013-06-15_00:00:00','2013-06-15_00:00:00',
 interval_seconds = 10800
 io_form_geogrid = 2,
/

&geogrid
 parent_id         =   1,   1,
 parent_grid_ratio =   1,   3,
 e_we              =  100, 121, \
                    # nested domain continues
 dx = 9000.0,
 map_proj = 'lambert',
 ref_lat   =  51.5,
 geog_data_path = '${GEOG_DATA}'
 opt_output_from_geogrid_path = '%(geog_data_path)/out'
 truelats = {'truelat1': 30.0, 'truelat2': 60.0}
/
"#;

fn env() -> Env {
    let mut env = Env::new();
    env.insert("GEOG_DATA".to_string(), "/data/WPS_GEOG".to_string());
    env
}

#[test]
fn parse_example_scenario() -> Result<()> {
    let doc = reads("&domain\nmax_dom = 2\ndx = 3000.0,\nprefix = 'GFS'\n")?;

    assert_eq!(doc.get("max_dom"), Some(&Value::Scalar(Scalar::Int(2))));
    assert_eq!(doc.get("dx"), Some(&Value::Scalar(Scalar::Float(3000.0))));
    assert_eq!(
        doc.get("prefix"),
        Some(&Value::Scalar(Scalar::Str("GFS".into())))
    );
    assert_eq!(doc.len(), 3);
    assert_eq!(
        doc.sections().collect::<Vec<_>>(),
        vec![(
            "domain",
            &["max_dom".to_string(), "dx".to_string(), "prefix".to_string()][..]
        )]
    );
    Ok(())
}

#[test]
fn list_parsing_scenario() -> Result<()> {
    let doc = reads("&share\nstart_date = '2013-06-14_00:00:00','2013-06-14_00:00:00',\n")?;
    let date = Scalar::Str("2013-06-14_00:00:00".into());
    assert_eq!(
        doc.get("start_date"),
        Some(&Value::List(vec![date.clone(), date]))
    );
    Ok(())
}

#[test]
fn local_reference_scenario() -> Result<()> {
    let doc = reads("&paths\nbase = /home/x\ngrb_dir = %(base)/grb\n")?;
    assert_eq!(doc.get("grb_dir"), Some(&Value::from("/home/x/grb")));
    Ok(())
}

#[test]
fn local_reference_only_sees_earlier_keys() -> Result<()> {
    let doc = reads("&paths\ngrb_dir = %(base)/grb\nbase = /home/x\n")?;
    assert_eq!(doc.get("grb_dir"), Some(&Value::from("%(base)/grb")));
    Ok(())
}

#[test]
fn local_reference_to_a_list_fails() {
    let err = reads("&a\nlevels = 1, 2\nname = %(levels)\n").unwrap_err();
    assert!(matches!(err, NamelistError::Expand(_)));
}

#[test]
fn update_without_section_fails_scenario() -> Result<()> {
    let mut doc = reads("&domains\n max_dom = 1\n")?;
    assert_eq!(
        doc.update("new_key", 5, None),
        Err(ValueError::MissingSection {
            key: "new_key".into()
        })
    );
    assert!(!doc.contains_key("new_key"));
    Ok(())
}

#[test]
fn parses_a_full_template() -> Result<()> {
    let doc = reads_with_env(NAMELIST_WPS, &env())?;

    assert_eq!(doc.section_names().collect::<Vec<_>>(), vec!["share", "geogrid"]);
    assert_eq!(doc.get("interval_seconds"), Some(&Value::from(10800)));
    assert_eq!(
        doc.get("e_we"),
        Some(&Value::List(vec![Scalar::Int(100), Scalar::Int(121)]))
    );
    assert_eq!(doc.section_of("dx"), Some("geogrid"));
    assert_eq!(doc.get("geog_data_path"), Some(&Value::from("/data/WPS_GEOG")));
    assert_eq!(
        doc.get("opt_output_from_geogrid_path"),
        Some(&Value::from("/data/WPS_GEOG/out"))
    );
    let truelats = doc.get("truelats").and_then(Value::as_map).unwrap();
    assert_eq!(truelats.get("truelat2"), Some(&Scalar::Float(60.0)));
    Ok(())
}

#[test]
fn round_trip_preserves_settings_and_sections() -> Result<()> {
    let doc = reads_with_env(NAMELIST_WPS, &env())?;
    let reparsed = reads(&doc.to_string())?;

    assert_eq!(
        reparsed.settings().collect::<Vec<_>>(),
        doc.settings().collect::<Vec<_>>()
    );
    assert_eq!(
        reparsed.sections().collect::<Vec<_>>(),
        doc.sections().collect::<Vec<_>>()
    );
    Ok(())
}

#[test]
fn edits_survive_a_round_trip() -> Result<()> {
    let mut doc = reads_with_env(NAMELIST_WPS, &env())?;
    doc.update("max_dom", 1, None)?;
    doc.update("fg_name", "FILE", Some("metgrid"))?;
    doc.remove("truelats");
    doc.remove("map_proj");

    let text = doc.to_string();
    assert!(text.contains("&metgrid\n fg_name = 'FILE',\n/\n"));
    assert!(!text.contains("truelat"));

    let reparsed = reads(&text)?;
    assert_eq!(reparsed.get("max_dom"), Some(&Value::from(1)));
    assert_eq!(reparsed.section_of("fg_name"), Some("metgrid"));
    assert_eq!(reparsed, doc);
    Ok(())
}
